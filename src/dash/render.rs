use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::dash::*;

const BAR_WIDTH: usize = 30;
const SHADES: [&str; 5] = [" ", "░", "▒", "▓", "█"];

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for idx in columns {
        if let Some(column) = table.column_mut(*idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// A horizontal bar, scaled so that `max` fills the whole width.
pub fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return "".to_string();
    }
    let n = ((value / max) * (BAR_WIDTH as f64)).round() as usize;
    "█".repeat(n.clamp(1, BAR_WIDTH))
}

/// A shading glyph for the heatmap, from blank (zero) to full (max).
pub fn shade(value: f64, max: f64) -> &'static str {
    if max <= 0.0 || value <= 0.0 {
        return SHADES[0];
    }
    let steps = (SHADES.len() - 1) as f64;
    let idx = ((value / max) * steps).ceil() as usize;
    SHADES[idx.clamp(1, SHADES.len() - 1)]
}

pub fn render_metrics(dash: &Dashboard) -> String {
    let m = &dash.metrics;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Total (selection)"),
        header_cell("Daily average (group)"),
        header_cell("Average per person"),
        header_cell("Total (sheet)"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        fmt_count(m.selection_total),
        fmt_average(m.average_per_day),
        fmt_average(m.average_per_person),
        m.sheet_total.map(fmt_count).unwrap_or_else(|| "—".to_string()),
    ]);
    align_right(&mut table, &[0, 1, 2, 3]);
    format!("{}", table)
}

pub fn render_daily(dash: &Dashboard) -> String {
    let max = dash.daily.iter().cloned().fold(0.0, f64::max);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Day"), header_cell("Count"), header_cell("")]);
    apply_table_style(&mut table);
    for (day, value) in dash.days.iter().zip(dash.daily.iter()) {
        table.add_row(vec![day.clone(), fmt_count(*value), bar(*value, max)]);
    }
    align_right(&mut table, &[1]);
    format!("{}", table)
}

pub fn render_ranking(dash: &Dashboard) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Member"),
        header_cell("Total"),
        header_cell("KPD"),
    ]);
    apply_table_style(&mut table);
    for (idx, entry) in dash.ranking.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            entry.name.clone(),
            fmt_count(entry.total),
            fmt_average(entry.average),
        ]);
    }
    align_right(&mut table, &[0, 2, 3]);
    format!("{}", table)
}

pub fn render_heatmap(dash: &Dashboard) -> String {
    let h = &dash.heatmap;
    let mut table = Table::new();
    let mut header = vec![header_cell("Member")];
    header.extend(h.columns.iter().map(|c| header_cell(c)));
    table.set_header(header);
    apply_table_style(&mut table);
    for (name, values) in h.rows.iter().zip(h.values.iter()) {
        let mut row = vec![Cell::new(name)];
        row.extend(
            values
                .iter()
                .map(|v| Cell::new(format!("{}{}", shade(*v, h.max), fmt_count(*v)))),
        );
        table.add_row(row);
    }
    format!("{}", table)
}

pub fn render_rivalry(dash: &Dashboard) -> String {
    let r = match &dash.rivalry {
        Some(r) => r,
        None => return "No participant to compare.".to_string(),
    };
    let max = r
        .first
        .values
        .iter()
        .chain(r.second.values.iter())
        .cloned()
        .fold(0.0, f64::max);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Day"),
        header_cell(&r.first.name),
        header_cell(""),
        header_cell(&r.second.name),
        header_cell(""),
    ]);
    apply_table_style(&mut table);
    for (idx, day) in r.days.iter().enumerate() {
        let a = r.first.values.get(idx).cloned().unwrap_or(0.0);
        let b = r.second.values.get(idx).cloned().unwrap_or(0.0);
        table.add_row(vec![
            day.clone(),
            fmt_count(a),
            bar(a, max),
            fmt_count(b),
            bar(b, max),
        ]);
    }
    align_right(&mut table, &[1, 3]);
    format!("{}", table)
}

/// Renders the requested parts of the dashboard, one titled section each.
pub fn render(dash: &Dashboard, view: View) -> String {
    let sections: [(View, &str, fn(&Dashboard) -> String); 5] = [
        (View::Summary, "Summary", render_metrics),
        (View::Daily, "Daily activity (sum)", render_daily),
        (View::Ranking, "Ranking", render_ranking),
        (View::Heatmap, "Heatmap (per day and member)", render_heatmap),
        (View::Rivalry, "Rivalry", render_rivalry),
    ];
    let mut res: Vec<String> = vec![format!("== {} ==", dash.sheet)];
    for (part, title, f) in sections.iter() {
        if view.shows(*part) {
            res.push(format!("{}\n{}", title, f(dash)));
        }
    }
    res.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_sheet::builder::Builder;

    fn dashboard() -> Dashboard {
        let table = Builder::new("2025")
            .days(&["1-Dec".to_string(), "2-Dec".to_string()])
            .participant("Ana", &[4.0, 0.0])
            .participant("Beto", &[1.0, 2.0])
            .total_row(&[5.0, 2.0])
            .build()
            .unwrap();
        build_dashboard(&table, &Selection::default()).unwrap()
    }

    #[test]
    fn bars_and_shades() {
        assert_eq!(bar(0.0, 4.0), "");
        assert_eq!(bar(4.0, 4.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(0.01, 4.0).chars().count(), 1);
        assert_eq!(shade(0.0, 4.0), " ");
        assert_eq!(shade(4.0, 4.0), "█");
        assert_eq!(shade(1.0, 4.0), "░");
    }

    #[test]
    fn metrics_section() {
        let s = render_metrics(&dashboard());
        assert!(s.contains("Total (sheet)"));
        assert!(s.contains("7"));
        assert!(s.contains("3.5"));
    }

    #[test]
    fn missing_sheet_total_is_a_dash() {
        let table = Builder::new("s")
            .days(&["d1".to_string()])
            .participant("Ana", &[1.0])
            .build()
            .unwrap();
        let dash = build_dashboard(&table, &Selection::default()).unwrap();
        assert!(render_metrics(&dash).contains("—"));
    }

    #[test]
    fn ranking_section() {
        let s = render_ranking(&dashboard());
        let ana = s.find("Ana").unwrap();
        let beto = s.find("Beto").unwrap();
        assert!(ana < beto);
        assert!(s.contains("2.0"));
    }

    #[test]
    fn views_select_sections() {
        let dash = dashboard();
        let s = render(&dash, View::Ranking);
        assert!(s.contains("Ranking"));
        assert!(!s.contains("Heatmap"));
        let all = render(&dash, View::All);
        for title in ["Summary", "Daily activity", "Ranking", "Heatmap", "Rivalry"] {
            assert!(all.contains(title), "missing {}", title);
        }
    }

    #[test]
    fn rivalry_section() {
        let s = render_rivalry(&dashboard());
        assert!(s.contains("Ana"));
        assert!(s.contains("Beto"));
        assert!(s.contains("1-Dec"));
    }
}
