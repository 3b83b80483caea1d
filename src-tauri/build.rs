fn main() {
    #[cfg(feature = "desktop")]
    {
        let manifest =
            tauri_build::AppManifest::new().commands(&["kiosk_permission_request"]);
        tauri_build::try_build(tauri_build::Attributes::new().app_manifest(manifest))
            .expect("failed to run tauri build script");
    }
}
