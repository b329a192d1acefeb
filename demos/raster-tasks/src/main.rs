use std::error::Error;
use std::path::{Path, PathBuf};

use argh::FromArgs;

use rasterkit::image::{Image, Parallelism, Pixel};
use rasterkit::imgproc::hough::HoughParams;
use rasterkit::io::{functional as F, terminal};

mod tasks;

use tasks::{Settings, Task, ThresholdMode};

#[derive(FromArgs)]
/// Run image processing tasks over a bitmap or a directory of bitmaps
struct Args {
    /// path to an input bitmap or a directory of bitmaps
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// directory for the output bitmaps (default: output)
    #[argh(option, short = 'o', default = "PathBuf::from(\"output\")")]
    output: PathBuf,

    /// task to run, repeatable (default: all tasks)
    #[argh(option, short = 't')]
    task: Vec<Task>,

    /// odd filter kernel size (default: 3)
    #[argh(option, short = 'k', default = "3")]
    kernel_size: usize,

    /// threshold: otsu, iterative or a gray level (default: otsu)
    #[argh(option, default = "ThresholdMode::Otsu")]
    threshold: ThresholdMode,

    /// hough theta resolution (default: 1440)
    #[argh(option, default = "1440")]
    theta_steps: usize,

    /// hough rho resolution (default: 1024)
    #[argh(option, default = "1024")]
    rho_steps: usize,

    /// hough cluster spread in buckets (default: 2)
    #[argh(option, default = "2")]
    spread: usize,

    /// frequency cutoff radius in bins (default: 30)
    #[argh(option, default = "30.0")]
    cutoff: f64,

    /// worker threads, 0 for the global pool (default: 0)
    #[argh(option, short = 'w', default = "0")]
    workers: usize,

    /// print a preview of every output in the terminal
    #[argh(switch, short = 'p')]
    preview: bool,
}

fn bitmap_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_bmp = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"));
        if path.is_file() && is_bmp {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn process_file(path: &Path, args: &Args, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let parallelism = match args.workers {
        0 => Parallelism::Auto,
        n => Parallelism::Workers(n),
    };
    let image: Image<Pixel> = F::read_image_bmp(path)?.with_parallelism(parallelism);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    log::info!("{}: {} image", path.display(), image.size());

    let tasks: Vec<Task> = if args.task.is_empty() {
        Task::ALL.to_vec()
    } else {
        args.task.clone()
    };

    for task in tasks {
        log::info!("{stem}: running {task:?}");
        for output in tasks::run(task, &image, settings)? {
            let out_path = args.output.join(format!("{stem}_{}.bmp", output.name));
            F::write_bmp(&out_path, &output.to_bitmap())?;
            log::debug!("wrote {}", out_path.display());
            if args.preview {
                println!("{}:", output.name);
                terminal::print_preview(&output.image)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let settings = Settings {
        kernel_size: args.kernel_size,
        threshold: args.threshold,
        hough: HoughParams {
            theta_steps: args.theta_steps,
            rho_steps: args.rho_steps,
            rho_max: None,
        },
        spread: args.spread,
        cutoff: args.cutoff,
    };

    std::fs::create_dir_all(&args.output)?;

    if args.input.is_dir() {
        let files = bitmap_files(&args.input)?;
        log::info!("batch mode: {} bitmaps in {}", files.len(), args.input.display());
        let mut failed = 0;
        for path in files.iter() {
            if let Err(e) = process_file(path, &args, &settings) {
                log::error!("skipping {}: {e}", path.display());
                failed += 1;
            }
        }
        log::info!("done: {} processed, {failed} skipped", files.len() - failed);
    } else {
        process_file(&args.input, &args, &settings)?;
    }

    Ok(())
}
