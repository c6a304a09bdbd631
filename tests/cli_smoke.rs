use std::path::PathBuf;

const SCENE: &str = "\
FPS 4
DURATION 1
SHAPE CIRCLE ID ball AT 60,60 RADIUS 20 COLOR #ff4444 MOVE TO 200,60 DUR 1
";

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_reelscript")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "reelscript.exe"
            } else {
                "reelscript"
            });
            p
        })
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("scene.reel"), SCENE).unwrap();
    dir
}

#[test]
fn cli_check_prints_scene_json() {
    let dir = scratch("check");
    let out = std::process::Command::new(exe())
        .args(["check", "--in"])
        .arg(dir.join("scene.reel"))
        .output()
        .unwrap();

    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["fps"], 4);
    assert_eq!(json["objects"][0]["id"], "ball");
}

#[test]
fn cli_check_rejects_bad_scene() {
    let dir = scratch("check_bad");
    std::fs::write(dir.join("bad.reel"), "FPS 60\n").unwrap();
    let status = std::process::Command::new(exe())
        .args(["check", "--in"])
        .arg(dir.join("bad.reel"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_frame_writes_png() {
    let dir = scratch("frame");
    let out_path = dir.join("out.png");
    let status = std::process::Command::new(exe())
        .args(["frame", "--frame", "0", "--in"])
        .arg(dir.join("scene.reel"))
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_render_writes_sequence() {
    let dir = scratch("render");
    let out_dir = dir.join("frames");
    let status = std::process::Command::new(exe())
        .args(["render", "--parallel", "--threads", "2", "--in"])
        .arg(dir.join("scene.reel"))
        .arg("--out-dir")
        .arg(&out_dir)
        .status()
        .unwrap();

    assert!(status.success());
    for i in 0..4 {
        assert!(out_dir.join(format!("frame_{i:06}.png")).exists());
    }
    assert!(!out_dir.join("frame_000004.png").exists());
}

#[test]
fn cli_render_accepts_watermark() {
    let dir = scratch("render_watermark");
    let out_dir = dir.join("frames");
    let status = std::process::Command::new(exe())
        .args(["render", "--watermark", "reel", "--in"])
        .arg(dir.join("scene.reel"))
        .arg("--out-dir")
        .arg(&out_dir)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(out_dir.join("frame_000003.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (640, 360));
}
