use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::model::PedigreePayload;
use crate::render::{render_svg, write_output_svg, RenderOptions};
use crate::session::PedigreeSession;
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pdgr", version, about = "Pedigree chart renderer in Rust")]
pub struct Args {
    /// Input payload JSON or '-' for stdin. Omit for the starter pedigree.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme name (clinical, print)
    #[arg(long = "theme")]
    pub theme: Option<String>,

    /// Write the slot-table dump as JSON before rendering
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Width override
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height override
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Skip diagnosis subtext under glyph labels
    #[arg(long = "noSubtext")]
    pub no_subtext: bool,

    /// Skip the cancer color legend
    #[arg(long = "noLegend")]
    pub no_legend: bool,

    /// Render with the edit-mode chart classes
    #[arg(long = "edit")]
    pub edit: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    if let Some(theme) = args.theme.as_deref() {
        config.theme = match theme {
            "print" => Theme::print(),
            "clinical" | "default" => Theme::clinical(),
            other => return Err(anyhow::anyhow!("Unknown theme `{other}`")),
        };
        config.render.background = config.theme.background.clone();
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let payload = read_payload(args.input.as_deref())?;
    let session = PedigreeSession::load(payload, config.layout.clone());

    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &session.table, &session.graph)?;
    }

    let options = RenderOptions {
        subtext: !args.no_subtext,
        legend: !args.no_legend,
        edit_mode: args.edit,
    };
    let svg = render_svg(&session.graph, &config, &options);

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            #[cfg(feature = "png")]
            crate::render::write_output_png(&svg, &output, &config)?;
            #[cfg(not(feature = "png"))]
            {
                let _ = output;
                return Err(anyhow::anyhow!(
                    "PNG output requires building with the `png` feature"
                ));
            }
        }
    }

    Ok(())
}

fn read_payload(path: Option<&Path>) -> Result<PedigreePayload> {
    let Some(path) = path else {
        return Ok(PedigreePayload::starter());
    };
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(PedigreePayload::from_json(&contents)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
