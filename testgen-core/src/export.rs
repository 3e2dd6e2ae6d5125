use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::TestCase;

/// Serializes a test case to pretty-printed JSON (two-space indent)
pub fn test_case_to_json(test_case: &TestCase) -> Result<String> {
    serde_json::to_string_pretty(test_case).context("Failed to serialize test case to JSON")
}

/// Export a test case to a JSON file
pub fn export_json(test_case: &TestCase, output_path: &Path) -> Result<()> {
    let json = test_case_to_json(test_case)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON export to {:?}", output_path))?;

    log::info!(
        "Exported {} to {}",
        test_case.test_case_id,
        output_path.display()
    );
    Ok(())
}

/// Renders a test case as a Markdown preview
pub fn test_case_to_markdown(test_case: &TestCase) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# {}: {}\n\n",
        test_case.test_case_id, test_case.title
    ));
    output.push_str(&format!("**Requirement:** {}  \n", test_case.req_id));
    output.push_str(&format!("**Status:** {}\n\n", test_case.status));

    output.push_str("## Test Steps\n\n");
    output.push_str("| Step | Action | Expected |\n");
    output.push_str("|------|--------|----------|\n");
    for step in &test_case.test_steps {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            step.step,
            escape_cell(&step.action),
            escape_cell(&step.expected)
        ));
    }
    output.push('\n');

    output.push_str("## Expected Results\n\n");
    output.push_str(&test_case.expected_results);
    output.push_str("\n\n");

    let profile = &test_case.data_profile;
    output.push_str("## Data Profile\n\n");
    for field in &profile.fields {
        output.push_str(&format!("- `{}` ({})\n", field.name, field.field_type));
    }
    output.push_str(&format!("\n**Rows:** {}  \n", profile.rows));
    output.push_str(&format!("**Note:** {}\n", profile.note));

    output
}

/// Export a test case to a Markdown file
pub fn export_markdown(test_case: &TestCase, output_path: &Path) -> Result<()> {
    fs::write(output_path, test_case_to_markdown(test_case))
        .with_context(|| format!("Failed to write Markdown export to {:?}", output_path))?;

    log::info!(
        "Exported {} preview to {}",
        test_case.test_case_id,
        output_path.display()
    );
    Ok(())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
