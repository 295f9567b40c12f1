mod binding;
mod event;
mod player;
mod sync;

pub use player::run;
