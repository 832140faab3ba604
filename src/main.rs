use anyhow::{Context, Result, bail};

use plotkit::designer::{Bed, GcodeGenerator, Layout, SvgImporter, ToolMode, save_layout};
use plotkit::geometry::CurveOptions;

const USAGE: &str = "\
plotkit - convert SVG artwork to plotter G-code

USAGE:
    plotkit [OPTIONS] <input.svg>...

OPTIONS:
    -o, --output <file>       write G-code to a file (default: stdout)
    -W, --width <mm>          placed width; height follows the aspect ratio
    -x, --pos-x <mm>          X of the left edge (bed X=0 is the center)
    -y, --pos-y <mm>          Y of the bottom edge
        --bed <WxH>           bed size in mm (default 300x200)
        --flatten             flatten curves to lines instead of arc fitting
        --vacuum              pick-and-place actuation (M3/M5)
        --save-layout <file>  also save the layout as JSON
    -V, --version             print version and exit
    -h, --help                print this help
";

#[derive(Debug, Default)]
struct CliOptions {
    inputs: Vec<String>,
    output: Option<String>,
    width: Option<f64>,
    pos_x: Option<f64>,
    pos_y: Option<f64>,
    bed: Option<(f64, f64)>,
    flatten: bool,
    vacuum: bool,
    save_layout: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Option<CliOptions>> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    fn value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
        iter.next()
            .map(String::as_str)
            .with_context(|| format!("{} requires a value", flag))
    }

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{}", USAGE);
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("plotkit {} (built {})", plotkit::VERSION, plotkit::BUILD_DATE);
                return Ok(None);
            }
            "-o" | "--output" => options.output = Some(value(&mut iter, arg)?.to_string()),
            "-W" | "--width" => {
                options.width = Some(value(&mut iter, arg)?.parse().context("bad --width")?)
            }
            "-x" | "--pos-x" => {
                options.pos_x = Some(value(&mut iter, arg)?.parse().context("bad --pos-x")?)
            }
            "-y" | "--pos-y" => {
                options.pos_y = Some(value(&mut iter, arg)?.parse().context("bad --pos-y")?)
            }
            "--bed" => {
                let size = value(&mut iter, arg)?;
                let (w, h) = size
                    .split_once(['x', 'X'])
                    .context("--bed expects WxH, e.g. 300x200")?;
                options.bed = Some((
                    w.parse().context("bad bed width")?,
                    h.parse().context("bad bed height")?,
                ));
            }
            "--flatten" => options.flatten = true,
            "--vacuum" => options.vacuum = true,
            "--save-layout" => options.save_layout = Some(value(&mut iter, arg)?.to_string()),
            other if other.starts_with('-') => bail!("unknown option {}\n\n{}", other, USAGE),
            input => options.inputs.push(input.to_string()),
        }
    }

    if options.inputs.is_empty() {
        bail!("no input files\n\n{}", USAGE);
    }
    Ok(Some(options))
}

fn main() -> Result<()> {
    plotkit::init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let bed = options
        .bed
        .map(|(w, h)| Bed::new(w, h))
        .unwrap_or_default();
    let mut layout = Layout::new(bed);

    let curve_options = if options.flatten {
        CurveOptions::flatten_only()
    } else {
        CurveOptions::default()
    };
    let importer = SvgImporter::with_options(curve_options);

    for input in &options.inputs {
        let item = importer.import_file(input)?;
        let id = layout.add_item(item);
        if let Some(width) = options.width {
            if let Some(item) = layout.item_mut(id) {
                item.set_width(width);
            }
        }
        if let Some(placement) = layout.item(id).map(|i| *i.placement()) {
            let pos_x = options.pos_x.unwrap_or(placement.pos_x);
            let pos_y = options.pos_y.unwrap_or(placement.pos_y);
            layout.move_item(id, pos_x, pos_y);
        }
    }

    if let Some(path) = &options.save_layout {
        save_layout(&layout, path)?;
    }

    let tool_mode = if options.vacuum {
        ToolMode::Vacuum
    } else {
        ToolMode::Pen
    };
    let program = GcodeGenerator::new(tool_mode).generate(&layout)?;

    match &options.output {
        Some(path) => {
            std::fs::write(path, program.text())
                .with_context(|| format!("failed to write {}", path))?;
            eprintln!(
                "wrote {} lines to {} (cut {:.1}mm, travel {:.1}mm, ~{:.1} min)",
                program.lines().len(),
                path,
                program.stats().cut_length,
                program.stats().travel_length,
                program.stats().estimated_minutes
            );
        }
        None => print!("{}", program.text()),
    }

    Ok(())
}
