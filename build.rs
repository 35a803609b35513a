use std::env;
use std::path::PathBuf;

// FFmpeg is linked through ffmpeg-next. On Windows the libraries are usually
// installed with vcpkg; point the user at the right environment variables.
fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=playprobe: FFMPEG_DIR is not set; the FFmpeg engine needs FFmpeg development libraries (try vcpkg)."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let install = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if install.exists() {
        println!(
            "cargo:warning=playprobe: found FFmpeg under {}; set FFMPEG_DIR to it to skip discovery.",
            install.display(),
        );
    } else {
        println!(
            "cargo:warning=playprobe: VCPKG_ROOT is set but {} does not exist.",
            install.display(),
        );
    }
}
