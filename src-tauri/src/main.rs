#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    kiosk_shell_lib::run();
}
