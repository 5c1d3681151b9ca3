use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CellValue, Column, Row, TableRequest};
use crate::render::classify::{classify, ColumnKind};
use crate::render::format::{format_cell_value, format_print_date};
use crate::render::html::{document, el, raw, text, Element};
use crate::render::order::{
    canonical_role, order_for_display, SemanticRole, INDEX_KEY, SUPPLIER_LABEL,
};

/// Fixed product report title used when the request carries none.
const DEFAULT_TITLE: &str = "דוח מוצרים";

const ASSISTANT_FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Assistant:wght@400;600;700&display=swap";

static DATE_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new("תאריך").expect("date label regex"));
static QUANTITY_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("כמות").expect("quantity label regex"));
static MONEY_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("מחיר|עלות").expect("money label regex"));

/// Render a table request as a complete, self-contained HTML document.
/// Pure and deterministic: identical input produces byte-identical output.
pub fn build_table_html(request: &TableRequest) -> String {
    let rtl = request.rtl;
    let (dir, lang) = if rtl { ("rtl", "he") } else { ("ltr", "en") };

    let formatted_date = format_print_date(request.printed_at_iso.as_deref());
    let total_count = request.rows.len();
    let render_columns = order_for_display(&request.columns);

    let head = el("head")
        .child(el("meta").attr("charset", "utf-8"))
        .child(
            el("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(
            el("link")
                .attr("rel", "preconnect")
                .attr("href", "https://fonts.googleapis.com"),
        )
        .child(
            el("link")
                .attr("rel", "preconnect")
                .attr("href", "https://fonts.gstatic.com")
                .attr("crossorigin", ""),
        )
        .child(
            el("link")
                .attr("rel", "stylesheet")
                .attr("href", ASSISTANT_FONT_URL),
        )
        .child(el("style").child(raw(stylesheet(rtl))));

    let title = request
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let summary = if rtl {
        format!("סך הכול: {total_count} מוצרים")
    } else {
        format!("Total: {total_count} items")
    };

    let date_cell = if formatted_date.is_empty() {
        el("div").attr("class", "meta-end")
    } else {
        let date_label = if rtl { "תאריך הפקה:" } else { "Printed:" };
        el("div")
            .attr("class", "meta-end")
            .child(text(format!("{date_label} {formatted_date}")))
    };

    // Row count anchored to the leading side, print date to the trailing
    // side, for both directions.
    let header_block = el("div")
        .attr("class", "header")
        .child(el("div").attr("class", "store").text(&request.store_name))
        .child(el("div").attr("class", "title").text(title))
        .child(
            el("div")
                .attr("class", "meta-row")
                .child(el("div").attr("class", "meta-start").text(summary))
                .child(date_cell),
        );

    let colgroup = el("colgroup").children(render_columns.iter().map(|column| {
        el("col")
            .attr("style", format!("width:{}", column_width(column)))
            .into()
    }));

    let header_row = el("tr").children(render_columns.iter().map(|column| {
        el("th")
            .attr("scope", "col")
            .attr("class", header_classes(column, classify(column)))
            .text(&column.label)
            .into()
    }));

    let tbody = el("tbody").children(
        request
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| body_row(row_index, row, &render_columns).into()),
    );

    let table = el("table")
        .child(colgroup)
        .child(el("thead").child(header_row))
        .child(tbody);

    let html = el("html")
        .attr("lang", lang)
        .attr("dir", dir)
        .child(head)
        .child(el("body").child(header_block).child(table));

    document(html)
}

fn body_row(row_index: usize, row: &Row, render_columns: &[Column]) -> Element {
    el("tr").children(render_columns.iter().map(|column| {
        let display = if column.key == INDEX_KEY {
            (row_index + 1).to_string()
        } else {
            format_cell_value(row.get(&column.key).unwrap_or(&CellValue::Null))
        };

        el("td")
            .attr("class", body_classes(column, classify(column)))
            .text(display)
            .into()
    }))
}

fn header_classes(column: &Column, kind: ColumnKind) -> String {
    let mut classes = vec!["th-cell"];
    if kind.numeric {
        classes.push("th-number");
    }
    if kind.cost {
        classes.push("th-cost");
    }
    if kind.identity_name {
        classes.push("th-name");
    }
    if column.key == INDEX_KEY {
        classes.push("th-index");
    }
    classes.join(" ")
}

fn body_classes(column: &Column, kind: ColumnKind) -> String {
    let mut classes = vec!["td-cell"];
    if column.key == INDEX_KEY {
        classes.push("td-index");
    }
    if kind.numeric {
        classes.push("td-number");
    }
    if kind.identity_name {
        classes.push("td-name");
    } else if !kind.numeric && column.key != INDEX_KEY {
        classes.push("td-text-narrow");
    }
    if kind.cost {
        classes.push("td-cost");
    }
    classes.join(" ")
}

/// Per-column width hint for the `<colgroup>`. An explicit request width
/// (millimeters) wins; otherwise the product heuristic: identity name wide,
/// supplier/SKU fixed percentages, date/quantity/money columns narrow fixed
/// widths, everything else a default narrow width. Never zero or negative.
fn column_width(column: &Column) -> String {
    if let Some(width) = column.width {
        if width > 0.0 {
            return format!("{width}mm");
        }
    }
    if column.key == INDEX_KEY {
        return "9mm".to_string();
    }

    match canonical_role(&column.label) {
        SemanticRole::Identity => "42%".to_string(),
        SemanticRole::Text => {
            let width = if column.label == SUPPLIER_LABEL { "16%" } else { "12%" };
            width.to_string()
        }
        SemanticRole::Date => "14%".to_string(),
        SemanticRole::Price | SemanticRole::Cost => "14mm".to_string(),
        SemanticRole::Carton => {
            let width = if MONEY_LABEL_RE.is_match(&column.label) { "14mm" } else { "12mm" };
            width.to_string()
        }
        SemanticRole::Index | SemanticRole::Other => {
            // Leftover columns fall back to label keywords.
            if DATE_LABEL_RE.is_match(&column.label) {
                "14%".to_string()
            } else if QUANTITY_LABEL_RE.is_match(&column.label) {
                "12mm".to_string()
            } else if MONEY_LABEL_RE.is_match(&column.label) {
                "14mm".to_string()
            } else {
                "12mm".to_string()
            }
        }
    }
}

/// Inline stylesheet. Physical alignment sides are resolved from the text
/// direction up front so numeric/index cells keep a stable reading order in
/// both directions.
fn stylesheet(rtl: bool) -> String {
    let dir = if rtl { "rtl" } else { "ltr" };
    let (start, end) = if rtl { ("right", "left") } else { ("left", "right") };

    format!(
        r#"
      @page {{ size: A4 landscape; margin: 12mm 10mm 12mm 10mm; }}
      html, body {{ padding: 0; margin: 0; }}
      body {{
        font-family: "Assistant", -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, "Noto Sans Hebrew", "Noto Sans", "Helvetica Neue", sans-serif;
        font-size: 12px;
        color: #111;
        direction: {dir};
        unicode-bidi: plaintext;
      }}

      .header {{
        display: flex;
        flex-direction: column;
        align-items: flex-start;
        text-align: {start};
        gap: 4px;
        margin-bottom: 10px;
      }}
      .store {{ font-weight: 700; font-size: 15px; }}
      .title {{ font-weight: 700; font-size: 12.5px; }}
      .meta-row {{
        width: 100%;
        display: flex;
        justify-content: space-between;
        align-items: center;
        gap: 8px;
        font-size: 10.5px;
        color: #444;
      }}
      .meta-start {{ text-align: {start}; }}
      .meta-end {{ text-align: {end}; }}

      table {{
        width: 100%;
        border-collapse: collapse;
        table-layout: fixed;
        direction: {dir};
      }}

      thead {{ display: table-header-group; }}
      tfoot {{ display: table-footer-group; }}
      tr {{ break-inside: avoid; }}

      th, td {{
        border: 1px solid #d7d7d7;
        padding: 5px 6px;
        vertical-align: top;
        text-align: {start};
        overflow: hidden;
        text-overflow: ellipsis;
        line-height: 1.25;
        unicode-bidi: plaintext;
      }}

      th {{
        background: #f3f4f6;
        font-weight: 700;
      }}

      .th-number {{ text-align: {end}; }}
      .th-index {{ text-align: center; }}
      .th-cost {{ font-weight: 700; }}

      .td-cell {{ font-size: 12px; }}

      .td-name {{
        text-align: {start};
        white-space: normal;
        overflow: visible;
        text-overflow: clip;
        font-weight: 700;
      }}

      .td-text-narrow {{
        text-align: {start};
        white-space: nowrap;
      }}

      .td-number {{
        text-align: {end};
        white-space: nowrap;
        direction: ltr;
      }}

      .td-cost {{ font-weight: 700; }}

      .td-index {{
        text-align: center;
        white-space: nowrap;
        direction: ltr;
      }}

      tbody tr:nth-child(even) td {{ background: #fafafa; }}
    "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use pretty_assertions::assert_eq;

    fn column(key: &str, label: &str) -> Column {
        Column {
            key: key.to_string(),
            label: label.to_string(),
            width: None,
        }
    }

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn sample_request() -> TableRequest {
        TableRequest {
            store_name: "סופר הצלחה".to_string(),
            title: None,
            printed_at_iso: Some("2024-03-05T10:00:00Z".to_string()),
            rtl: true,
            columns: vec![
                column("supplier", "ספק"),
                column("name", "שם מוצר"),
                column("cost", "מחיר עלות"),
            ],
            rows: vec![
                row(&[
                    ("name", CellValue::Text("קפה נמס".to_string())),
                    ("supplier", CellValue::Text("אלית".to_string())),
                    ("cost", CellValue::Number(12.into())),
                ]),
                row(&[("name", CellValue::Text("סוכר".to_string()))]),
            ],
        }
    }

    #[test]
    fn output_is_deterministic() {
        let request = sample_request();
        assert_eq!(build_table_html(&request), build_table_html(&request));
    }

    #[test]
    fn document_is_self_contained_html() {
        let html = build_table_html(&sample_request());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<html lang=\"he\" dir=\"rtl\">"));
        assert!(html.contains("direction: rtl"));
        assert!(html.contains("<style>"));
    }

    #[test]
    fn ltr_flag_flips_direction_and_locale() {
        let mut request = sample_request();
        request.rtl = false;
        let html = build_table_html(&request);
        assert!(html.contains("<html lang=\"en\" dir=\"ltr\">"));
        assert!(html.contains("direction: ltr"));
        assert!(html.contains("Total: 2 items"));
    }

    #[test]
    fn unsafe_content_never_reaches_markup_positions() {
        let mut request = sample_request();
        request.store_name = "<script>alert('x')</script>".to_string();
        request.rows = vec![row(&[(
            "name",
            CellValue::Text("\"><img src=x onerror=evil()>".to_string()),
        )])];

        let html = build_table_html(&request);
        assert!(!html.contains("<script"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn index_column_counts_rows_from_one_in_input_order() {
        let html = build_table_html(&sample_request());
        let first = html.find("<td class=\"td-cell td-index\">1</td>").unwrap();
        let second = html.find("<td class=\"td-cell td-index\">2</td>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn absent_row_keys_render_the_placeholder() {
        let html = build_table_html(&sample_request());
        // Second row has neither supplier nor cost.
        assert!(html.contains("—"));
    }

    #[test]
    fn zero_rows_still_render_header_row_and_summary() {
        let mut request = sample_request();
        request.rows = vec![];
        let html = build_table_html(&request);

        assert!(html.contains("סך הכול: 0 מוצרים"));
        assert!(html.contains("<thead><tr><th"));
        assert!(html.contains("<tbody></tbody>"));
    }

    #[test]
    fn header_cells_carry_semantic_classes() {
        let html = build_table_html(&sample_request());
        assert!(html.contains("class=\"th-cell th-index\""));
        assert!(html.contains("class=\"th-cell th-name\""));
        assert!(html.contains("class=\"th-cell th-number th-cost\""));
    }

    #[test]
    fn cost_cells_are_numeric_and_emphasized() {
        let html = build_table_html(&sample_request());
        assert!(html.contains("class=\"td-cell td-number td-cost\""));
    }

    #[test]
    fn colgroup_reflects_width_policy() {
        let html = build_table_html(&sample_request());
        assert!(html.contains("<col style=\"width:9mm\" />")); // index
        assert!(html.contains("<col style=\"width:42%\" />")); // product name
        assert!(html.contains("<col style=\"width:16%\" />")); // supplier
        assert!(html.contains("<col style=\"width:14mm\" />")); // cost
    }

    #[test]
    fn explicit_column_width_overrides_heuristic() {
        let mut request = sample_request();
        request.columns[1].width = Some(55.0);
        let html = build_table_html(&request);
        assert!(html.contains("<col style=\"width:55mm\" />"));
        assert!(!html.contains("width:42%"));
    }

    #[test]
    fn count_sits_on_leading_side_and_date_on_trailing_side() {
        let html = build_table_html(&sample_request());
        let count = html.find("meta-start").unwrap();
        let date = html.find("meta-end").unwrap();
        assert!(count < date);
        assert!(html.contains("תאריך הפקה: 05.03.2024"));
    }

    #[test]
    fn missing_date_leaves_the_meta_cell_blank() {
        let mut request = sample_request();
        request.printed_at_iso = None;
        let html = build_table_html(&request);
        assert!(html.contains("<div class=\"meta-end\"></div>"));
        assert!(!html.contains("תאריך הפקה"));
    }

    #[test]
    fn request_title_replaces_the_default() {
        let mut request = sample_request();
        assert!(build_table_html(&request).contains(DEFAULT_TITLE));

        request.title = Some("מלאי שבועי".to_string());
        let html = build_table_html(&request);
        assert!(html.contains("מלאי שבועי"));
        assert!(!html.contains(DEFAULT_TITLE));
    }

    #[test]
    fn canonical_order_applies_to_rendered_headers() {
        let html = build_table_html(&sample_request());
        let name = html.find(">שם מוצר<").unwrap();
        let supplier = html.find(">ספק<").unwrap();
        let cost = html.find(">מחיר עלות<").unwrap();
        assert!(name < supplier && supplier < cost);
    }

    #[test]
    fn unknown_columns_render_after_canonical_ones() {
        let mut request = sample_request();
        request.columns.push(column("extra", "custom"));
        request.rows = vec![];
        let html = build_table_html(&request);

        let cost = html.find(">מחיר עלות<").unwrap();
        let custom = html.find(">custom<").unwrap();
        assert!(cost < custom);
        // Unknown columns get the default narrow width.
        assert!(html.contains("<col style=\"width:12mm\" />"));
    }
}
