//! Plain-text rendering of the shopping list

use std::fmt::Write;

use rbox_common::{Ingredient, IngredientSummaryRow, ShoppingListEntry};

const NAME_HEADER: &str = "Ingredient Name";
const QUANTITY_HEADER: &str = "Quantity";
const UNITS_HEADER: &str = "Units";

/// Format a quantity with at most two decimals, trailing zeros trimmed
pub fn format_quantity(quantity: f64) -> String {
    let fixed = format!("{:.2}", quantity);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// "qty units name", skipping the units when empty
pub fn format_ingredient(ingredient: &Ingredient) -> String {
    let quantity = format_quantity(ingredient.quantity);
    if ingredient.units.is_empty() {
        format!("{} {}", quantity, ingredient.name)
    } else {
        format!("{} {} {}", quantity, ingredient.units, ingredient.name)
    }
}

/// Summary table: name left-aligned, quantity and units right-aligned
pub fn render_summary(rows: &[IngredientSummaryRow]) -> String {
    let quantities: Vec<String> = rows.iter().map(|r| format_quantity(r.total_quantity)).collect();

    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .chain([NAME_HEADER.len()])
        .max()
        .unwrap_or(0);
    let quantity_width = quantities
        .iter()
        .map(String::len)
        .chain([QUANTITY_HEADER.len()])
        .max()
        .unwrap_or(0);
    let units_width = rows
        .iter()
        .map(|r| r.units.chars().count())
        .chain([UNITS_HEADER.len()])
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<nw$}  {:>qw$}  {:>uw$}",
        NAME_HEADER,
        QUANTITY_HEADER,
        UNITS_HEADER,
        nw = name_width,
        qw = quantity_width,
        uw = units_width
    );
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(name_width),
        "-".repeat(quantity_width),
        "-".repeat(units_width)
    );

    if rows.is_empty() {
        out.push_str("(shopping list is empty)\n");
        return out;
    }

    for (row, quantity) in rows.iter().zip(&quantities) {
        let _ = writeln!(
            out,
            "{:<nw$}  {:>qw$}  {:>uw$}",
            row.name,
            quantity,
            row.units,
            nw = name_width,
            qw = quantity_width,
            uw = units_width
        );
    }

    out
}

/// One block per recipe: authored ingredients next to the scaled totals
pub fn render_recipes(entries: &[ShoppingListEntry]) -> String {
    let mut out = String::new();

    for entry in entries {
        let _ = writeln!(out, "{} (#{})", entry.recipe_name, entry.recipe_id);
        let _ = writeln!(out, "  Servings: {}", entry.servings);
        if let Some(cover) = entry.image_urls.first() {
            let _ = writeln!(out, "  Image: {}", cover);
        }

        out.push_str("  Ingredients:\n");
        for ingredient in &entry.original_ingredients {
            let _ = writeln!(out, "    {}", format_ingredient(ingredient));
        }

        out.push_str("  Total Ingredients:\n");
        for ingredient in &entry.scaled_ingredients {
            let _ = writeln!(out, "    {}", format_ingredient(ingredient));
        }

        out.push('\n');
    }

    out
}
