use std::time::Instant;

use eframe::egui;

use super::binding::{ButtonIcon, UiBinding};
use super::event::{PlayerEvent, SliderChange};
use crate::audio::{KiraPlayback, PlaybackHandle};
use crate::config::PlayerConfig;
use crate::error::Result;

static TRACK: &[u8] = include_bytes!("../../assets/calmdown.wav");

const ACCENT: egui::Color32 = egui::Color32::from_rgb(190, 155, 65);

pub fn run(config: PlayerConfig) -> std::result::Result<(), eframe::Error> {
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.window.width, config.window.height])
        .with_title(config.title.clone())
        .with_resizable(false);

    let options = eframe::NativeOptions {
        centered: true,
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Calm Down",
        options,
        Box::new(move |cc| Ok(Box::new(PlayerApp::new(cc, config)))),
    )
}

enum Screen<P: PlaybackHandle> {
    Ready(UiBinding<P>),
    /// The track never loaded; controls stay disabled.
    Failed(String),
}

impl<P: PlaybackHandle> Screen<P> {
    fn close(&mut self) {
        if let Screen::Ready(binding) = self {
            binding.destroy();
        }
    }
}

pub struct PlayerApp {
    title: String,
    screen: Screen<KiraPlayback>,
}

impl PlayerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: PlayerConfig) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.selection.bg_fill = egui::Color32::from_rgb(170, 120, 25);
        visuals.selection.stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 175, 55));
        visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(145, 115, 35));
        visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(195, 158, 50));
        visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 178, 60));
        cc.egui_ctx.set_visuals(visuals);

        let screen = match Self::open(&config) {
            Ok(binding) => Screen::Ready(binding),
            Err(err) => {
                tracing::error!(%err, "player screen unavailable");
                Screen::Failed(err.to_string())
            }
        };
        Self {
            title: config.title,
            screen,
        }
    }

    fn open(config: &PlayerConfig) -> Result<UiBinding<KiraPlayback>> {
        let playback = KiraPlayback::load(TRACK, config.volume)?;
        Ok(UiBinding::new(
            playback,
            std::time::Duration::from_millis(config.tick_interval_ms),
        ))
    }
}

pub(crate) fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if let Screen::Ready(binding) = &mut self.screen {
            binding.pump(now);
        }

        let panel_width = 360.0;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(egui::RichText::new("Now Playing").size(12.0).color(ACCENT));
                ui.label(
                    egui::RichText::new(&self.title)
                        .size(18.0)
                        .color(egui::Color32::WHITE),
                );
                ui.add_space(16.0);

                match &mut self.screen {
                    Screen::Ready(binding) => transport(ui, binding, panel_width, now),
                    Screen::Failed(error) => {
                        disabled_transport(ui, panel_width);
                        ui.add_space(8.0);
                        ui.label(
                            egui::RichText::new(error.as_str())
                                .size(12.0)
                                .color(egui::Color32::from_rgb(255, 100, 100)),
                        );
                    }
                }
            });
        });

        if let Screen::Ready(binding) = &self.screen {
            if let Some(wait) = binding.next_wakeup(Instant::now()) {
                ctx.request_repaint_after(wait);
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.screen.close();
    }
}

fn transport(ui: &mut egui::Ui, binding: &mut UiBinding<KiraPlayback>, panel_width: f32, now: Instant) {
    let slider = binding.slider();
    let mut shown = slider.progress as f64;

    ui.allocate_ui(egui::vec2(panel_width, 20.0), |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format_time(slider.progress)).monospace().size(12.0));
            ui.spacing_mut().slider_width = panel_width - 110.0;
            let response = ui.add(
                egui::Slider::new(&mut shown, 0.0..=slider.max.max(1) as f64).show_value(false),
            );

            let pressed = response.is_pointer_button_down_on();
            if pressed && !binding.is_seeking() {
                binding.handle(PlayerEvent::SliderTouchDown, now);
            }
            if response.changed() {
                let value = shown.max(0.0).round() as u64;
                binding.handle(PlayerEvent::SliderChanged(SliderChange::UserDrag(value)), now);
            }
            if !pressed && binding.is_seeking() {
                binding.handle(PlayerEvent::SliderTouchUp, now);
            }

            ui.label(
                egui::RichText::new(format_time(binding.playback().duration_ms()))
                    .monospace()
                    .size(12.0),
            );
        });
    });

    ui.add_space(12.0);

    let label = binding.icon().label();
    if ui
        .add_sized(
            egui::vec2(80.0, 28.0),
            egui::Button::new(egui::RichText::new(label).color(egui::Color32::from_gray(175))),
        )
        .clicked()
    {
        binding.handle(PlayerEvent::PlayPauseTapped, now);
    }
}

fn disabled_transport(ui: &mut egui::Ui, panel_width: f32) {
    let mut shown = 0.0_f64;
    ui.allocate_ui(egui::vec2(panel_width, 20.0), |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format_time(0)).monospace().size(12.0));
            ui.spacing_mut().slider_width = panel_width - 110.0;
            ui.add_enabled(false, egui::Slider::new(&mut shown, 0.0..=1.0).show_value(false));
            ui.label(egui::RichText::new(format_time(0)).monospace().size(12.0));
        });
    });
    ui.add_space(12.0);
    ui.add_enabled(
        false,
        egui::Button::new(ButtonIcon::Play.label()).min_size(egui::vec2(80.0, 28.0)),
    );
}
