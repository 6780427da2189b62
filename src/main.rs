use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut settings_dir = None;
    let mut nocam = false;
    let mut write_defaults = false;

    for arg in std::env::args_os().skip(1) {
        let flag = arg.to_string_lossy().into_owned();
        match flag.as_str() {
            "--nocam" => nocam = true,
            "--write-defaults" => write_defaults = true,
            _ => settings_dir = Some(PathBuf::from(arg)),
        }
    }

    let app = match mobilewebcam_lib::run(settings_dir) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if write_defaults {
        if let Err(e) = app.settings.write_settings_file() {
            log::error!("[MAIN] Could not write settings: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if nocam {
        if let Err(e) = app.processor.postprocess_nocam_image() {
            log::error!("[MAIN] Could not store no-camera picture: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
