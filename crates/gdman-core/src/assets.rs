use gdman_backend::{EngineAsset, RawAsset};

const IGNORED: &[&str] = &["export_templates", "headless", "server", ".tpz", ".sha256"];

/// Substrings identifying the engine archive for the running platform, in
/// order of preference. Covers both the 3.x and 4.x naming schemes.
pub fn platform_keys() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["win64"]
    }

    #[cfg(target_os = "macos")]
    {
        &["macos.universal", "osx.universal", "osx.64", "osx_64", "osx"]
    }

    #[cfg(all(unix, not(target_os = "macos"), target_arch = "aarch64"))]
    {
        &["linux.arm64", "linux_arm64"]
    }

    #[cfg(all(unix, not(target_os = "macos"), not(target_arch = "aarch64")))]
    {
        &["linux.x86_64", "linux_x86_64", "x11.64", "x11_64"]
    }

    #[cfg(not(any(unix, windows)))]
    {
        &[]
    }
}

/// Picks the standard and Mono archives matching `keys`.
pub fn select_assets(
    assets: &[RawAsset],
    keys: &[&str],
) -> (Option<EngineAsset>, Option<EngineAsset>) {
    let candidates: Vec<&RawAsset> = assets
        .iter()
        .filter(|a| {
            let name = a.name.to_ascii_lowercase();
            name.ends_with(".zip") && !IGNORED.iter().any(|i| name.contains(i))
        })
        .collect();

    let pick = |mono: bool| {
        keys.iter().find_map(|key| {
            candidates
                .iter()
                .find(|a| {
                    let name = a.name.to_ascii_lowercase();
                    name.contains(key) && name.contains("mono") == mono
                })
                .map(|a| EngineAsset {
                    name: a.name.clone(),
                    url: a.browser_download_url.clone(),
                    size: a.size,
                })
        })
    };

    (pick(false), pick(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> RawAsset {
        RawAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{}", name),
            size: 1,
        }
    }

    #[test]
    fn test_select_godot4_linux() {
        let assets = vec![
            asset("Godot_v4.2-stable_export_templates.tpz"),
            asset("Godot_v4.2-stable_linux.x86_32.zip"),
            asset("Godot_v4.2-stable_linux.x86_64.zip"),
            asset("Godot_v4.2-stable_mono_linux_x86_64.zip"),
            asset("Godot_v4.2-stable_win64.exe.zip"),
        ];
        let (standard, mono) = select_assets(&assets, &["linux.x86_64", "linux_x86_64"]);
        assert_eq!(standard.unwrap().name, "Godot_v4.2-stable_linux.x86_64.zip");
        assert_eq!(mono.unwrap().name, "Godot_v4.2-stable_mono_linux_x86_64.zip");
    }

    #[test]
    fn test_select_godot3_linux_skips_headless() {
        let assets = vec![
            asset("Godot_v3.5-stable_linux_headless.64.zip"),
            asset("Godot_v3.5-stable_x11.64.zip"),
            asset("Godot_v3.5-stable_mono_x11_64.zip"),
        ];
        let (standard, mono) = select_assets(&assets, &["x11.64", "x11_64"]);
        assert_eq!(standard.unwrap().name, "Godot_v3.5-stable_x11.64.zip");
        assert_eq!(mono.unwrap().name, "Godot_v3.5-stable_mono_x11_64.zip");
    }

    #[test]
    fn test_select_windows() {
        let assets = vec![
            asset("Godot_v4.2-stable_win32.exe.zip"),
            asset("Godot_v4.2-stable_win64.exe.zip"),
            asset("Godot_v4.2-stable_mono_win64.zip"),
        ];
        let (standard, mono) = select_assets(&assets, &["win64"]);
        assert_eq!(standard.unwrap().name, "Godot_v4.2-stable_win64.exe.zip");
        assert_eq!(mono.unwrap().name, "Godot_v4.2-stable_mono_win64.zip");
    }

    #[test]
    fn test_no_matching_assets() {
        let (standard, mono) = select_assets(&[asset("README.txt")], &["win64"]);
        assert!(standard.is_none());
        assert!(mono.is_none());
    }
}
