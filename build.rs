fn main() {
    #[cfg(windows)]
    {
        println!("cargo:rerun-if-changed=assets/icon.ico");
        if std::path::Path::new("assets/icon.ico").exists() {
            let mut res = tauri_winres::WindowsResource::new();
            // ordinal 1 → default alert icon
            res.set_icon_with_id("assets/icon.ico", "1");
            res.compile().expect("Failed to compile resources");
        }
    }
}
