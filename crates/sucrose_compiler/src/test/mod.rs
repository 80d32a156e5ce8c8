#[macro_use]
mod run_sample;
