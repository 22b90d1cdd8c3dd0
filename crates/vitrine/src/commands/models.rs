//! List the built-in site models.

use anyhow::Result;
use vitrine_core::{site_models_by_category, Category};

/// Run the models command.
pub fn run(category: Option<&str>) -> Result<()> {
    let category = category.map(str::parse::<Category>).transpose()?;
    let models = site_models_by_category(category);

    if models.is_empty() {
        tracing::info!("No site models found");
        return Ok(());
    }

    for model in models {
        let sections: Vec<&str> = model
            .sections
            .iter()
            .map(|s| s.section_type.as_str())
            .collect();
        println!("{:<20} {:<15} {}", model.id, model.category, model.name);
        println!("{:<20} {}", "", model.description);
        println!("{:<20} sections: {}", "", sections.join(", "));
    }

    Ok(())
}
