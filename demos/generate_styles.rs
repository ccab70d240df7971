use std::{error::Error, fs};

use qrpad::{
    config::GeneratorConfig,
    generator::{render, OutputFormat, RenderOptions},
    StyleSelection,
};

fn main() -> Result<(), Box<dyn Error>> {
    let data = "https://example.com";

    // One file per style preset, both formats
    for style in StyleSelection::ALL {
        for format in [OutputFormat::Svg, OutputFormat::Png] {
            let mut options = RenderOptions::from_config(&GeneratorConfig::default(), style);
            options.data = data.to_string();
            options.format = format;
            options.margin = 20;

            let artifact = render(&options)?;
            let path = format!("qr_{}.{}", style.name(), format.extension());
            fs::write(&path, artifact.as_bytes())?;
            println!("{style} code saved to: {path}");
        }
    }

    Ok(())
}
