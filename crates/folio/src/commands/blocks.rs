//! `folio blocks` command implementation.

use clap::Args;
use folio_blocks::{BlockDefinition, Category, SchemaRegistry};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the blocks command.
#[derive(Args)]
pub(crate) struct BlocksArgs {
    /// Only list this category (content, media, layout, forms, advanced).
    #[arg(long)]
    category: Option<String>,

    /// Print definitions as JSON.
    #[arg(long)]
    json: bool,
}

impl BlocksArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let registry = SchemaRegistry::builtin();
        let category = self
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()?;
        let definitions = registry.list_definitions(category);

        if self.json {
            let json = serde_json::to_string_pretty(&definitions)
                .map_err(|e| CliError::Validation(e.to_string()))?;
            output.print(&json);
            return Ok(());
        }

        for definition in definitions {
            output.heading(&format!(
                "{} ({}, {})",
                definition.block_type,
                definition.name,
                definition.category.as_str()
            ));
            output.detail(&describe_fields(definition));
        }
        Ok(())
    }
}

/// One-line summary of a definition's editable fields.
fn describe_fields(definition: &BlockDefinition) -> String {
    if definition.editable_fields.is_empty() {
        return "  no editable fields".to_owned();
    }
    let fields: Vec<_> = definition
        .editable_fields
        .iter()
        .map(|f| {
            if f.options.is_empty() {
                f.key.clone()
            } else {
                format!("{}=[{}]", f.key, f.options.join("|"))
            }
        })
        .collect();
    format!("  {}", fields.join(", "))
}
