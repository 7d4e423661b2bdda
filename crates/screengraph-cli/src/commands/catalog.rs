use console::style;

use screengraph_appium::tool_catalog;
use screengraph_core::ToolCategory;

const SECTIONS: [(ToolCategory, &str); 3] = [
    (ToolCategory::Connection, "Connection"),
    (ToolCategory::DataGathering, "Data gathering"),
    (ToolCategory::Action, "Actions"),
];

pub(super) fn cmd_tools(json: bool) -> screengraph_core::Result<()> {
    let catalog = tool_catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let width = catalog.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for (category, title) in SECTIONS {
        println!("{}", style(title).bold().underlined());
        for tool in catalog.iter().filter(|t| t.category == category) {
            let marker = if tool.is_mutating {
                style("*").yellow()
            } else {
                style(" ")
            };
            println!(
                "  {marker} {:<width$}  {}",
                style(&tool.name).cyan(),
                tool.description
            );
        }
        println!();
    }
    println!("{}", style("* changes device or app state").dim());
    Ok(())
}
