/// MedView native host.
///
/// Usage: `medview-native [FILE] [--out PNG] [--size WxH] [--log-level LEVEL] [--save-config]`
///
/// Without a file argument a file dialog is shown. The file is run through the
/// ingestion pipeline, the resulting case is opened and rendered to a PNG, and
/// the preliminary report is printed. `--save-config` writes the effective
/// configuration to the user config directory and exits.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use medview::geometry::Size;
    use medview::native;
    use medview::{AppConfig, Navigation, ViewerMessage, ViewerSession, ViewerStatus};
    use web_time::Instant;

    let mut config = AppConfig::load_from_default_path().unwrap_or_default();

    let mut file = None;
    let mut save_config = false;
    let mut out = PathBuf::from("medview-frame.png");
    let mut size = Size::new(1024.0, 768.0);
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => match args.next() {
                Some(path) => out = PathBuf::from(path),
                None => {
                    eprintln!("--out needs a path");
                    return ExitCode::FAILURE;
                }
            },
            "--size" => match args.next().as_deref().and_then(parse_size) {
                Some(parsed) => size = parsed,
                None => {
                    eprintln!("--size needs WIDTHxHEIGHT");
                    return ExitCode::FAILURE;
                }
            },
            "--log-level" => match args.next().map(|level| level.parse()) {
                Some(Ok(level)) => config.preferences.log_level = level,
                _ => {
                    eprintln!("--log-level needs one of error, warn, info, debug, trace");
                    return ExitCode::FAILURE;
                }
            },
            "--save-config" => save_config = true,
            _ => file = Some(PathBuf::from(arg)),
        }
    }
    native::init_logging(config.preferences.log_level);

    if save_config {
        return match config.save_to_default_path() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(path) = file.or_else(native::pick_upload) else {
        log::info!("No file chosen");
        return ExitCode::SUCCESS;
    };

    let mut session = match ViewerSession::with_sample_cases(&config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Bundled sample cases are invalid: {}", e);
            return ExitCode::FAILURE;
        }
    };
    session.handle(ViewerMessage::Resized(size));

    let upload = match native::read_upload(&path) {
        Ok(upload) => upload,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = session.submit_upload(upload, Instant::now()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let case_id = loop {
        if let Some(label) = session.ingestion_stage() {
            println!("{label}");
        }
        if let Some(wait) = session.time_until_tick(Instant::now()) {
            std::thread::sleep(wait);
        }
        if let Err(e) = session.poll(Instant::now()) {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        if let Some(Navigation::OpenViewer(id)) = session.take_navigation().pop() {
            break id;
        }
        if !session.is_ingesting() {
            eprintln!("Ingestion stopped without producing a case");
            return ExitCode::FAILURE;
        }
    };

    let requests = match session.open_case(&case_id) {
        Ok(requests) => requests,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for request in requests {
        let result = native::load_image(&request.url);
        session.image_loaded(&request.ticket, result);
    }

    match session.status() {
        ViewerStatus::Ready => match session.render() {
            Some(frame) => match frame.save(&out) {
                Ok(()) => println!("Frame written to {}", out.display()),
                Err(e) => log::error!("Failed to write {}: {}", out.display(), e),
            },
            None => log::warn!("Nothing to draw at {}x{}", size.width, size.height),
        },
        ViewerStatus::ImageLoadError(error) => eprintln!("{error}"),
        other => log::warn!("Viewer not ready: {:?}", other),
    }

    if let Some(report) = session.report() {
        println!("\n{report}");
    }
    ExitCode::SUCCESS
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_size(value: &str) -> Option<medview::geometry::Size> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let size = medview::geometry::Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    size.has_area().then_some(size)
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
