use clap::{Parser, Subcommand};
use pantry_scan::checksum::{expand_upce, is_valid_checksum, validate_for_format};
use pantry_scan::engine::linescan::LineScanEngine;
use pantry_scan::engine::replay::{FramePoll, FrameReplay};
use pantry_scan::models::{BarcodeFormat, NormalizedPoint, NormalizedRect};
use pantry_scan::orchestrator::GalleryScan;
use pantry_scan::roi::PointerEvent;
use pantry_scan::session::{Notice, ScanEvent, ScanHost, ScannerSession, ViewMode};
use pantry_scan::tools::{load_frames, load_selected_file, parse_rect};
use pantry_scan::utils::crop::crop_to_region;
use pantry_scan::{AcceptedBarcode, ScanConfig, ScanResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "scantool", version, about = "Pantry barcode scanning tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the check digit of a code
    Checksum {
        code: String,
        /// Validate as this format (ean_13, ean_8, upc_a, upc_e, ...)
        #[arg(long)]
        format: Option<String>,
    },
    /// Decode a whole image at the default tier, then the high tier
    Decode {
        #[arg(long)]
        image: PathBuf,
    },
    /// Crop and upscale a normalized region, writing a JPEG
    Crop {
        #[arg(long)]
        image: PathBuf,
        /// x,y,w,h in [0, 1]
        #[arg(long)]
        rect: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode only a normalized region of an image
    ScanRegion {
        #[arg(long)]
        image: PathBuf,
        /// x,y,w,h in [0, 1]
        #[arg(long)]
        rect: String,
    },
    /// Play a directory of frames through the live camera flow
    Replay {
        #[arg(long)]
        frames: PathBuf,
        /// Identical reads required before accepting
        #[arg(long)]
        stable: Option<u32>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Checksum { code, format } => checksum_cmd(&code, format.as_deref()),
        Command::Decode { image } => decode_cmd(&image),
        Command::Crop { image, rect, out } => crop_cmd(&image, &rect, out),
        Command::ScanRegion { image, rect } => scan_region_cmd(&image, &rect),
        Command::Replay { frames, stable } => replay_cmd(&frames, stable),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(2)
        }
    }
}

fn checksum_cmd(code: &str, format: Option<&str>) -> ScanResult<bool> {
    let valid = match format {
        Some(name) => {
            let Some(format) = BarcodeFormat::from_name(name) else {
                eprintln!("Unknown format {:?}", name);
                return Ok(false);
            };
            if format == BarcodeFormat::UpcE {
                if let Some(expanded) = expand_upce(code) {
                    println!("UPC-E {} expands to {}", code, expanded);
                }
            }
            validate_for_format(code, format)
        }
        None => is_valid_checksum(code),
    };
    println!("{}: {}", code, if valid { "valid" } else { "invalid" });
    Ok(valid)
}

fn decode_cmd(image: &Path) -> ScanResult<bool> {
    let config = ScanConfig::from_env();
    let mut gallery = GalleryScan::new(&config);
    gallery.select_file(load_selected_file(image)?)?;

    let mut engine = LineScanEngine::new();
    let start = Instant::now();
    let found = gallery.decode_whole_image(&mut engine)?;
    let elapsed = start.elapsed();

    println!("Image: {}", image.display());
    for attempt in gallery.attempts() {
        println!(
            "  {:?} tier: {}",
            attempt.tier,
            describe(attempt.result.as_ref().map(|d| d.code.as_str()), attempt.accepted)
        );
    }
    match found {
        Some(detection) => println!("Detected {} ({})", detection.code, detection.format),
        None => println!("{}", gallery.message().unwrap_or("No barcode found.")),
    }
    println!("Time: {:.2?}", elapsed);
    Ok(gallery.detected().is_some())
}

fn crop_cmd(image: &Path, rect: &str, out: Option<PathBuf>) -> ScanResult<bool> {
    let config = ScanConfig::from_env();
    let rect = parse_rect(rect)?;
    let payload = load_selected_file(image)?.into_payload()?;
    let cropped = crop_to_region(&payload, &rect, &config.crop);
    if cropped == payload {
        println!("Crop not possible, image left unchanged");
        return Ok(false);
    }

    let out = out.unwrap_or_else(|| default_crop_path(image));
    std::fs::write(&out, &cropped.bytes)?;
    let (width, height) = cropped.decode().map(|img| (img.width(), img.height()))?;
    println!("Wrote {} ({}x{})", out.display(), width, height);
    Ok(true)
}

fn scan_region_cmd(image: &Path, rect: &str) -> ScanResult<bool> {
    let config = ScanConfig::from_env();
    let rect = parse_rect(rect)?;
    let mut gallery = GalleryScan::new(&config);
    gallery.select_file(load_selected_file(image)?)?;
    draw_selection(&mut gallery, &rect);

    let mut engine = LineScanEngine::new();
    match gallery.scan_selection(&mut engine)? {
        Some(detection) => {
            println!("Detected {} ({})", detection.code, detection.format);
            Ok(true)
        }
        None => {
            println!("{}", gallery.message().unwrap_or("No barcode found."));
            Ok(false)
        }
    }
}

fn replay_cmd(frames: &Path, stable: Option<u32>) -> ScanResult<bool> {
    let mut config = ScanConfig::from_env();
    if let Some(n) = stable {
        config = config.with_stable_detections(n);
    }
    let frames = load_frames(frames)?;
    println!("Replaying {} frames (stable detections: {})", frames.len(), config.stable_detections);

    let mut session =
        ScannerSession::with_config(FrameReplay::new(frames), ConsoleHost::default(), config);
    session.handle(ScanEvent::ChooseCamera);

    let mut index = 0usize;
    while session.view() == ViewMode::Camera {
        index += 1;
        match session.engine_mut().poll_frame() {
            FramePoll::Detected(detection) => {
                println!("  frame {}: {} ({})", index, detection.code, detection.format);
                session.handle(ScanEvent::Detected(detection));
            }
            FramePoll::Empty => println!("  frame {}: -", index),
            FramePoll::Finished => {
                session.handle(ScanEvent::Cancel);
            }
        }
    }

    let (_, host) = session.into_parts();
    match host.accepted {
        Some(code) => {
            println!("Accepted {}", code);
            Ok(true)
        }
        None => {
            println!("No barcode accepted");
            Ok(false)
        }
    }
}

#[derive(Default)]
struct ConsoleHost {
    accepted: Option<AcceptedBarcode>,
}

impl ScanHost for ConsoleHost {
    fn on_barcode_accepted(&mut self, barcode: AcceptedBarcode) {
        self.accepted = Some(barcode);
    }

    fn on_cancelled(&mut self) {}

    fn notify(&mut self, notice: Notice) {
        println!("[{}] {}", notice.title, notice.body);
    }
}

fn draw_selection(gallery: &mut GalleryScan, rect: &NormalizedRect) {
    gallery.pointer(PointerEvent::Down(NormalizedPoint::new(rect.x, rect.y)));
    gallery.pointer(PointerEvent::Move(NormalizedPoint::new(
        rect.x + rect.w,
        rect.y + rect.h,
    )));
    gallery.pointer(PointerEvent::Up);
}

fn describe(code: Option<&str>, accepted: bool) -> String {
    match (code, accepted) {
        (Some(code), true) => code.to_string(),
        (Some(code), false) => format!("{} (check digit mismatch)", code),
        (None, _) => "nothing".to_string(),
    }
}

fn default_crop_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{stem}_crop.jpg"))
}
