//! Breathing technique catalog commands.

use clap::Subcommand;

use breathflow_core::technique;

#[derive(Subcommand)]
pub enum TechniqueAction {
    /// List the built-in techniques
    List,
    /// Show one technique by id
    Show {
        /// Technique id, e.g. `4-7-8`
        id: String,
    },
}

pub fn run(action: TechniqueAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TechniqueAction::List => {
            println!("{}", serde_json::to_string_pretty(&technique::builtin())?);
        }
        TechniqueAction::Show { id } => match technique::find(&id) {
            Some(t) => println!("{}", serde_json::to_string_pretty(&t)?),
            None => return Err(format!("unknown technique '{id}'").into()),
        },
    }
    Ok(())
}
