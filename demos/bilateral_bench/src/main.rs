use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bilateral::image::{GrayImage, ImageSize};
use bilateral::imgproc::filter::{BilateralFilter, BilateralParams, ExecutionMode};
use bilateral::imgproc::parallel::ExecutionStrategy;

#[derive(FromArgs)]
/// Run the bilateral filter on every image of a directory and report the timings
struct Args {
    /// directory with the input images
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// directory for the filtered images, one subdirectory per filtering mode
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// diameter of the pixel neighborhood
    #[argh(option, default = "9")]
    diameter: usize,

    /// sigma of the intensity gaussian
    #[argh(option, default = "70.0")]
    sigma_intensity: f64,

    /// sigma of the spatial gaussian
    #[argh(option, default = "70.0")]
    sigma_spatial: f64,

    /// number of threads of the fixed size pool
    #[argh(option, default = "4")]
    threads: usize,
}

struct Run {
    name: &'static str,
    mode: ExecutionMode,
    times_ms: Vec<f64>,
}

fn read_gray(path: &Path) -> Result<GrayImage, Box<dyn std::error::Error>> {
    let gray = image::open(path)?.to_luma8();
    let size = ImageSize {
        width: gray.width() as usize,
        height: gray.height() as usize,
    };
    Ok(GrayImage::new(size, gray.into_raw())?)
}

fn write_gray(path: &Path, img: &GrayImage) -> Result<(), Box<dyn std::error::Error>> {
    let img = img.to_contiguous();
    let buffer = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or("failed to create the output buffer")?;
    buffer.save(path)?;
    Ok(())
}

fn mean(times: &[f64]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    times.iter().sum::<f64>() / times.len() as f64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let params = BilateralParams::new(args.diameter, args.sigma_intensity, args.sigma_spatial);
    params.validate()?;

    let mut runs = [
        Run {
            name: "sequential",
            mode: ExecutionMode::Cpu(ExecutionStrategy::Serial),
            times_ms: Vec::new(),
        },
        Run {
            name: "parallel",
            mode: ExecutionMode::Cpu(ExecutionStrategy::ParallelRows),
            times_ms: Vec::new(),
        },
        Run {
            name: "parallel_fixed",
            mode: ExecutionMode::Cpu(ExecutionStrategy::Fixed(args.threads)),
            times_ms: Vec::new(),
        },
        Run {
            name: "accelerator",
            mode: ExecutionMode::Accelerator,
            times_ms: Vec::new(),
        },
    ];

    let mut entries = std::fs::read_dir(&args.input)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries.iter().filter(|p| p.is_file()) {
        let Some(file_name) = path.file_name() else {
            continue;
        };

        let src = match read_gray(path) {
            Ok(src) => src,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        log::info!("-- image processed: {:?} {}", file_name, src.size());

        for run in runs.iter_mut() {
            let filter = BilateralFilter::new(params).with_mode(run.mode);

            let start = Instant::now();
            let out = filter.apply(&src)?;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

            if !out.is_filtered() {
                log::info!("[{:?}] {}: passthrough, not timed or saved", file_name, run.name);
                continue;
            }

            run.times_ms.push(elapsed_ms);
            log::info!("[{:?}] {}: {:.2} ms", file_name, run.name, elapsed_ms);

            let out_dir = args.output.join(run.name);
            std::fs::create_dir_all(&out_dir)?;
            write_gray(&out_dir.join(file_name), &out.image)?;
        }
    }

    log::info!("-- average analysis:");
    for run in runs.iter().filter(|r| !r.times_ms.is_empty()) {
        log::info!("{:<16} mean elapsed time: {:.2} ms", run.name, mean(&run.times_ms));
    }

    log::info!("-- speedup analysis:");
    for (i, slow) in runs.iter().enumerate() {
        for fast in runs.iter().skip(i + 1) {
            if slow.times_ms.is_empty() || fast.times_ms.is_empty() {
                continue;
            }
            log::info!(
                "|{:<16} / {:<16}| speedup: {:.2}x",
                slow.name,
                fast.name,
                mean(&slow.times_ms) / mean(&fast.times_ms)
            );
        }
    }

    Ok(())
}
