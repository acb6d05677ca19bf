use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use schemix_engine::{LayeredLayout, LayeredLayoutConfig};
use schemix_netlist::{Editor, PendingLayout, LayoutRequest, UuidIds};

use crate::document;
use crate::ui::StyledText;

#[derive(Args, Debug, Clone)]
#[command(about = "Arrange instances left to right and route wires")]
pub struct LayoutArgs {
    #[arg(value_name = "SCHEMATIC")]
    pub schematic: PathBuf,

    /// Vertical gap between stacked instances
    #[arg(long, default_value_t = 100.0)]
    pub node_spacing: f64,

    /// Horizontal gap between layers
    #[arg(long, default_value_t = 100.0)]
    pub layer_spacing: f64,
}

pub fn execute(args: LayoutArgs) -> Result<()> {
    let schematic = document::load(&args.schematic, false)?;
    let engine = LayeredLayout::new(LayeredLayoutConfig {
        node_spacing: args.node_spacing,
        layer_spacing: args.layer_spacing,
    });

    let mut editor = Editor::new(schematic, UuidIds);
    let pending = PendingLayout {
        generation: editor.generation(),
        request: LayoutRequest::from_schematic(editor.current()),
    };
    if let Err(e) = editor.run_layout(&engine, &pending) {
        eprintln!("{}", "Layout failed, schematic left unchanged".error());
        return Err(e.into());
    }

    let laid_out = editor.current();
    document::save(&args.schematic, laid_out)?;
    println!(
        "{}",
        format!(
            "Laid out {} instances and {} wires",
            laid_out.instances.len(),
            laid_out.wires.len()
        )
        .success()
    );
    Ok(())
}
