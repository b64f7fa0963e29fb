mod app;
mod app_runtime;
mod boot;
mod config;
mod dom;
mod fetch;
mod keyboard;
mod render;

fn main() {
    console_error_panic_hook::set_once();
    boot::start();
}
