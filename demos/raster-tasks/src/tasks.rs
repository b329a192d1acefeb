use std::collections::BTreeSet;
use std::error::Error;
use std::f64::consts::PI;
use std::str::FromStr;

use rasterkit::image::{Image, ImageSize, Pixel};
use rasterkit::imgproc::{
    color, draw,
    filter::{self, kernels},
    frequency::{self, Band, CutoffMask},
    histogram,
    hough::{self, AngleFilter, HoughParams, LineThreshold},
    plot::{self, Scaling},
    point::{Point, Rect},
    segmentation::{self, GrayRange, GrowthOptions, IterativeThreshold},
    warp,
};
use rasterkit::io::Bitmap;
use rasterkit::linalg::Transform;

/// A processing step of the demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Gray,
    Channels,
    Histogram,
    Equalize,
    Blur,
    Sharpen,
    Median,
    Edges,
    Warp,
    Threshold,
    Grow,
    Regions,
    QuadTree,
    Hough,
    Plate,
    Frequency,
}

impl Task {
    pub const ALL: [Task; 16] = [
        Task::Gray,
        Task::Channels,
        Task::Histogram,
        Task::Equalize,
        Task::Blur,
        Task::Sharpen,
        Task::Median,
        Task::Edges,
        Task::Warp,
        Task::Threshold,
        Task::Grow,
        Task::Regions,
        Task::QuadTree,
        Task::Hough,
        Task::Plate,
        Task::Frequency,
    ];
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let task = match s {
            "gray" => Task::Gray,
            "channels" => Task::Channels,
            "histogram" => Task::Histogram,
            "equalize" => Task::Equalize,
            "blur" => Task::Blur,
            "sharpen" => Task::Sharpen,
            "median" => Task::Median,
            "edges" => Task::Edges,
            "warp" => Task::Warp,
            "threshold" => Task::Threshold,
            "grow" => Task::Grow,
            "regions" => Task::Regions,
            "quadtree" => Task::QuadTree,
            "hough" => Task::Hough,
            "plate" => Task::Plate,
            "frequency" => Task::Frequency,
            other => return Err(format!("unknown task `{other}`")),
        };
        Ok(task)
    }
}

/// How the segmentation threshold is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdMode {
    Otsu,
    Iterative,
    Fixed(u32),
}

impl FromStr for ThresholdMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "otsu" => Ok(ThresholdMode::Otsu),
            "iterative" => Ok(ThresholdMode::Iterative),
            level => level
                .parse::<u32>()
                .map(ThresholdMode::Fixed)
                .map_err(|_| format!("threshold must be `otsu`, `iterative` or a level, got `{level}`")),
        }
    }
}

/// Tunables shared by all tasks.
pub struct Settings {
    pub kernel_size: usize,
    pub threshold: ThresholdMode,
    pub hough: HoughParams,
    pub spread: usize,
    pub cutoff: f64,
}

/// A named output image and whether it is stored with a palette.
pub struct Output {
    pub name: String,
    pub image: Image<Pixel>,
    pub palette: bool,
}

impl Output {
    fn rgb(name: &str, image: Image<Pixel>) -> Self {
        Self {
            name: name.to_string(),
            image,
            palette: false,
        }
    }

    fn gray(name: &str, image: Image<Pixel>) -> Self {
        Self {
            name: name.to_string(),
            image,
            palette: true,
        }
    }

    /// Encode as a bitmap, 8-bit when requested and possible.
    pub fn to_bitmap(&self) -> Bitmap {
        let mut bitmap = Bitmap::new(self.image.clone());
        if self.palette {
            if let Err(e) = bitmap.change_to_eight_bit() {
                log::warn!("{}: keeping 24-bit: {e}", self.name);
            }
        }
        bitmap
    }
}

type TaskResult = Result<Vec<Output>, Box<dyn Error>>;

/// Run one task on `image`.
pub fn run(task: Task, image: &Image<Pixel>, settings: &Settings) -> TaskResult {
    match task {
        Task::Gray => Ok(vec![
            Output::gray("gray", color::grayscale(image)),
            Output::gray("inverted", color::invert(&color::grayscale(image))),
        ]),
        Task::Channels => Ok(vec![
            Output::gray("red", color::extract_channel(image, color::Channel::Red)),
            Output::gray("green", color::extract_channel(image, color::Channel::Green)),
            Output::gray("blue", color::extract_channel(image, color::Channel::Blue)),
        ]),
        Task::Histogram => Ok(vec![Output::gray(
            "histogram",
            histogram::gray_histogram_plot(image, 1024, 256, 256)?,
        )]),
        Task::Equalize => {
            let equalized = color::equalize_histogram(image);
            let plot = histogram::gray_histogram_plot(&equalized, 1024, 256, 256)?;
            Ok(vec![
                Output::gray("equalized", equalized),
                Output::gray("equalized_histogram", plot),
            ])
        }
        Task::Blur => {
            let k = settings.kernel_size;
            Ok(vec![
                Output::rgb("box", filter::filter2d(image, &kernels::box_blur(k)?)),
                Output::rgb(
                    "gaussian",
                    filter::filter2d(image, &kernels::gaussian(k, k as f64 / 3.0)?),
                ),
            ])
        }
        Task::Sharpen => Ok(vec![Output::rgb(
            "sharpen",
            filter::filter2d(image, &kernels::sharpen()),
        )]),
        Task::Median => Ok(vec![Output::rgb(
            "median",
            filter::median_filter(image, settings.kernel_size)?,
        )]),
        Task::Edges => Ok(vec![
            Output::gray("sobel", filter::sobel_magnitude(image)?),
            Output::gray("laplacian", filter::laplacian_edges(image)),
        ]),
        Task::Warp => warp_task(image),
        Task::Threshold => {
            let t = pick_threshold(image, settings.threshold);
            log::info!("threshold {t}");
            Ok(vec![Output::gray(
                "threshold",
                segmentation::segment_by_threshold(image, t, Pixel::BLACK, Pixel::WHITE),
            )])
        }
        Task::Grow => grow_task(image),
        Task::Regions => regions_task(image, settings),
        Task::QuadTree => {
            let rect = Rect::new(0, image.width(), 0, image.height());
            let tree = segmentation::build_quad_tree(image, rect, 4, segmentation::variance_below(150.0))?;
            let mut out = image.clone();
            for leaf in segmentation::leaf_boxes(&tree) {
                draw::draw_box(&mut out, &leaf, Pixel::RED);
            }
            Ok(vec![Output::rgb("quadtree", out)])
        }
        Task::Hough => hough_task(image, settings),
        Task::Plate => plate_task(image, settings),
        Task::Frequency => frequency_task(image, settings),
    }
}

fn pick_threshold(image: &Image<Pixel>, mode: ThresholdMode) -> u32 {
    match mode {
        ThresholdMode::Otsu => segmentation::auto_threshold_otsu(image),
        ThresholdMode::Iterative => {
            segmentation::auto_threshold_iteration(image, &IterativeThreshold::default())
        }
        ThresholdMode::Fixed(t) => t,
    }
}

fn warp_task(image: &Image<Pixel>) -> TaskResult {
    let (cx, cy) = (image.width() as f64 / 2.0, image.height() as f64 / 2.0);
    let about_center = |t: Transform| {
        Transform::identity()
            .translate(-cx, -cy)
            .then(&t)
            .translate(cx, cy)
    };
    let background = Pixel::new(0, 0, 0, 255);
    let variants = [
        ("rotate", about_center(Transform::identity().rotate(PI / 6.0))),
        ("scale", about_center(Transform::identity().scale(0.6, 0.8))),
        ("shear", about_center(Transform::identity().shear(0.3, 0.0))),
        (
            "perspective",
            about_center(Transform::identity().perspective(0.001, 0.0005)),
        ),
        (
            "translate",
            Transform::identity().translate(cx / 2.0, -cy / 3.0),
        ),
    ];
    Ok(variants
        .iter()
        .map(|(name, t)| Output::rgb(name, warp::linear_transform(image, t, background)))
        .collect())
}

fn grow_task(image: &Image<Pixel>) -> TaskResult {
    let seeds = BTreeSet::from([Point::new(
        image.width() as i64 / 2,
        image.height() as i64 / 2,
    )]);
    let range = GrayRange::from_points(image, &seeds).ok_or("image has no center pixel")?;
    let (region, range) = segmentation::grow_region(
        image,
        &seeds,
        &GrowthOptions::default(),
        range,
        |p, img, _, range| match img.get(p.x as usize, p.y as usize) {
            Some(px) => range.admit(px.gray_level(), 40),
            None => (false, range),
        },
    );
    log::info!("grown region: {} pixels, gray {}..={}", region.len(), range.min, range.max);

    let mut out = image.clone();
    draw::draw_points(&mut out, &region, Pixel::RED);
    Ok(vec![Output::rgb("grow", out)])
}

fn region_color(i: usize) -> Pixel {
    Pixel::rgb(
        (64 + i * 97 % 192) as u8,
        (64 + i * 59 % 192) as u8,
        (64 + i * 137 % 192) as u8,
    )
}

fn regions_task(image: &Image<Pixel>, settings: &Settings) -> TaskResult {
    let t = pick_threshold(image, settings.threshold);
    let binary = segmentation::segment_by_threshold(image, t, Pixel::BLACK, Pixel::WHITE);
    let regions = segmentation::split_region(&binary, Pixel::BLACK, 1.0);
    log::info!("{} regions at threshold {t}", regions.len());

    let mut labeled = draw::blank_canvas(image.size(), Pixel::BLACK);
    for (i, region) in regions.iter().enumerate() {
        draw::draw_points(&mut labeled, region, region_color(i));
    }

    let mut borders = draw::blank_canvas(image.size(), Pixel::BLACK);
    for border in segmentation::region_borders(&regions) {
        draw::draw_points(&mut borders, &border, Pixel::WHITE);
    }

    let mut traces = draw::blank_canvas(image.size(), Pixel::BLACK);
    for (i, trace) in segmentation::border_trace(&binary, Pixel::BLACK, 1.0)
        .iter()
        .enumerate()
    {
        draw::draw_points(&mut traces, trace, region_color(i));
    }

    Ok(vec![
        Output::gray("binary", binary),
        Output::rgb("regions", labeled),
        Output::gray("borders", borders),
        Output::rgb("traces", traces),
    ])
}

fn edge_grid(image: &Image<Pixel>) -> Result<Image<f64>, Box<dyn Error>> {
    let edges = filter::sobel_magnitude(image)?;
    let t = segmentation::auto_threshold_otsu(&edges);
    let binary = segmentation::segment_by_threshold(&edges, t, Pixel::BLACK, Pixel::WHITE);
    Ok(color::intensity(&binary))
}

fn hough_task(image: &Image<Pixel>, settings: &Settings) -> TaskResult {
    let grid = edge_grid(image)?;
    let acc = hough::hough_transform(&grid, &settings.hough, AngleFilter::All)?;
    let lines = hough::get_lines(&acc, LineThreshold::default());
    let clustered = hough::get_lines_bfs(&acc, settings.spread, LineThreshold::default(), AngleFilter::All);
    log::info!("{} peak lines, {} clustered lines", lines.len(), clustered.len());

    Ok(vec![
        Output::gray("hough_space", plot::plot_grid(acc.cells(), Scaling::Normalize)),
        Output::rgb("hough_lines", hough::draw_lines(image, &lines, Pixel::RED)),
        Output::rgb("hough_clusters", hough::draw_lines(image, &clustered, Pixel::GREEN)),
    ])
}

fn plate_task(image: &Image<Pixel>, settings: &Settings) -> TaskResult {
    let grid = edge_grid(image)?;
    let filter = AngleFilter::AxisAligned { tolerance: 0.05 };
    let acc = hough::hough_transform(&grid, &settings.hough, AngleFilter::All)?;
    let lines = hough::get_lines_bfs(&acc, settings.spread, LineThreshold::Auto(0.3), filter);
    let corners = hough::detect_quadrilateral(&lines, 0.5).ok_or("no quadrilateral found")?;
    log::info!("plate corners {corners:?}");

    let mut outline = image.clone();
    draw::draw_polygon(&mut outline, &corners, Pixel::RED);

    let size = ImageSize {
        width: 400,
        height: 100,
    };
    let (w, h) = ((size.width - 1) as f64, (size.height - 1) as f64);
    let src = corners.map(|p| (p.x as f64, p.y as f64));
    let transform = Transform::from_quad(&src, &[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)])?;
    let plate = warp::try_linear_transform_to(image, &transform, size, Pixel::BLACK)?;

    Ok(vec![Output::rgb("plate_outline", outline), Output::rgb("plate", plate)])
}

fn frequency_task(image: &Image<Pixel>, settings: &Settings) -> TaskResult {
    let grid = color::intensity(image);
    let spectrum = frequency::fft(&frequency::pad_to_power_of_two(&grid))?;
    let (magnitude, _) = frequency::polar_transform(&spectrum);

    let low_pass = frequency::frequency_filter(&grid, &CutoffMask::new(settings.cutoff, Band::High))?;
    let high_pass = frequency::frequency_filter(&grid, &CutoffMask::new(settings.cutoff, Band::Low))?;

    Ok(vec![
        Output::gray("spectrum", plot::plot_grid(&magnitude, Scaling::LogNormalize)),
        Output::gray("low_pass", plot::plot_grid(&low_pass, Scaling::Clamp)),
        Output::gray("high_pass", plot::plot_grid(&high_pass, Scaling::Normalize)),
    ])
}
