//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{AgoraArgs, OutputFormat};
use crate::error::Result;
use crate::search::response::MultiEntitySearchResponse;
use crate::understanding::understander::{QueryUnderstanding, Understanding};

/// Report structure for query analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub query: String,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub understanding: QueryUnderstanding,
}

impl AnalysisReport {
    /// Build a report from an understanding outcome.
    pub fn from_understanding(query: &str, understanding: Understanding) -> Self {
        match understanding {
            Understanding::Complete(understanding) => AnalysisReport {
                query: query.to_string(),
                complete: true,
                fallback_reason: None,
                understanding,
            },
            Understanding::Degraded { fallback, reason } => AnalysisReport {
                query: query.to_string(),
                complete: false,
                fallback_reason: Some(reason),
                understanding: fallback,
            },
        }
    }
}

/// Report structure for search runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub duration_ms: u64,
    pub response: MultiEntitySearchResponse,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &AgoraArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &AgoraArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    // Convert to JSON value for easier manipulation
    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("SearchReport") => {
            output_search_report_human(&value, args)
        }
        _ if std::any::type_name::<T>().contains("AnalysisReport") => {
            output_analysis_report_human(&value, args)
        }
        _ => output_generic_human(&value, args),
    }
}

/// Output a search report in human format.
fn output_search_report_human(value: &serde_json::Value, args: &AgoraArgs) -> Result<()> {
    let Some(obj) = value.as_object() else {
        return output_generic_human(value, args);
    };
    let Some(response) = obj.get("response").and_then(|r| r.as_object()) else {
        return output_generic_human(value, args);
    };

    println!("Search Results:");
    println!("═══════════════");

    for (section, key) in [
        ("Products", "products"),
        ("Brands", "brands"),
        ("Merchants", "merchants"),
    ] {
        let Some(items) = response.get(key).and_then(|i| i.as_array()) else {
            continue;
        };
        if items.is_empty() {
            continue;
        }

        println!();
        println!("{section}:");
        println!("─────────");

        for (i, item) in items.iter().enumerate() {
            let score = item
                .get("normalized_score")
                .and_then(|s| s.as_f64())
                .or_else(|| item.get("score").and_then(|s| s.as_f64()))
                .unwrap_or(0.0);
            let name = item
                .get("document")
                .and_then(|d| d.get("name"))
                .and_then(|n| n.as_str())
                .unwrap_or("(unnamed)");
            println!("{:2}. (score {score:.3}) {name}", i + 1);

            if let Some(doc) = item.get("document").and_then(|d| d.as_object()) {
                let mut details = Vec::new();
                if let Some(brand) = doc.get("brand").and_then(|b| b.as_str()) {
                    details.push(brand.to_string());
                }
                if let Some(price) = doc.get("price").and_then(|p| p.as_f64()) {
                    details.push(format!("${price:.2}"));
                }
                if let Some(rating) = doc.get("rating").and_then(|r| r.as_f64()) {
                    details.push(format!("rating {rating:.1}"));
                }
                if !details.is_empty() {
                    println!("    {}", details.join(" | "));
                }
            }

            if let Some(highlight) = item.get("highlight").and_then(|h| h.as_str()) {
                println!("    {highlight}");
            }
        }
    }

    println!();
    if let Some(pagination) = response.get("pagination").and_then(|p| p.as_object()) {
        let total = pagination.get("total").and_then(|t| t.as_u64()).unwrap_or(0);
        let page = pagination.get("page").and_then(|p| p.as_u64()).unwrap_or(1);
        let total_pages = pagination
            .get("total_pages")
            .and_then(|t| t.as_u64())
            .unwrap_or(0);
        println!("Total results: {total} (page {page}/{total_pages})");
    }
    if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
        println!("Search time: {duration}ms");
    }

    if let Some(facets) = response.get("facets").and_then(|f| f.as_object()) {
        print_facets_human(facets);
    }

    if let Some(metadata) = response.get("nlp_metadata").and_then(|m| m.as_object()) {
        println!();
        println!("Query understanding:");
        println!("────────────────────");
        if let Some(intent) = metadata.get("detected_intent").and_then(|i| i.as_str()) {
            let confidence = metadata
                .get("confidence")
                .and_then(|c| c.as_f64())
                .unwrap_or(0.0);
            println!("Intent: {intent} (confidence {confidence:.2})");
        }
        if let Some(entities) = metadata
            .get("recognized_entities")
            .and_then(|e| e.as_array())
            && !entities.is_empty()
        {
            let rendered: Vec<String> = entities.iter().map(format_entity).collect();
            println!("Entities: {}", rendered.join(", "));
        }
        if let Some(terms) = metadata.get("expanded_terms").and_then(|t| t.as_array())
            && !terms.is_empty()
        {
            let rendered: Vec<&str> = terms.iter().filter_map(|t| t.as_str()).collect();
            println!("Expanded terms: {}", rendered.join(", "));
        }
        if let Some(elapsed) = metadata.get("processing_time_ms").and_then(|e| e.as_u64()) {
            println!("Understanding time: {elapsed}ms");
        }
    }

    Ok(())
}

/// Print the facet block of a response object.
fn print_facets_human(facets: &serde_json::Map<String, serde_json::Value>) {
    let mut printed_header = false;
    for (facet_name, values) in facets {
        let Some(values) = values.as_array() else {
            continue;
        };
        if values.is_empty() {
            continue;
        }
        if !printed_header {
            println!();
            println!("Facets:");
            println!("───────");
            printed_header = true;
        }
        println!("{facet_name}:");
        for value in values {
            let label = value
                .get("value")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let count = value.get("count").and_then(|c| c.as_u64()).unwrap_or(0);
            println!("  {label} ({count})");
        }
    }

    if let Some(price) = facets.get("price").and_then(|p| p.as_object()) {
        if !printed_header {
            println!();
            println!("Facets:");
            println!("───────");
        }
        let min = price.get("min").and_then(|m| m.as_f64()).unwrap_or(0.0);
        let max = price.get("max").and_then(|m| m.as_f64()).unwrap_or(0.0);
        println!("price: ${min:.2} to ${max:.2}");
    }
}

/// Output an analysis report in human format.
fn output_analysis_report_human(value: &serde_json::Value, args: &AgoraArgs) -> Result<()> {
    let Some(obj) = value.as_object() else {
        return output_generic_human(value, args);
    };

    println!("Query Analysis:");
    println!("═══════════════");

    if let Some(query) = obj.get("query").and_then(|q| q.as_str()) {
        println!("Query: {query}");
    }
    if obj.get("complete").and_then(|c| c.as_bool()) == Some(false) {
        let reason = obj
            .get("fallback_reason")
            .and_then(|r| r.as_str())
            .unwrap_or("unknown");
        println!("Degraded: {reason}");
    }

    let Some(understanding) = obj.get("understanding").and_then(|u| u.as_object()) else {
        return Ok(());
    };

    for (label, key) in [("Tokens", "tokens"), ("Stems", "stems")] {
        if let Some(items) = understanding.get(key).and_then(|i| i.as_array())
            && !items.is_empty()
        {
            let rendered: Vec<&str> = items.iter().filter_map(|i| i.as_str()).collect();
            println!("{label}: {}", rendered.join(", "));
        }
    }

    if let Some(intent) = understanding.get("intent").and_then(|i| i.as_object()) {
        let primary = intent
            .get("primary")
            .and_then(|p| p.as_str())
            .unwrap_or("unknown");
        let confidence = intent
            .get("confidence")
            .and_then(|c| c.as_f64())
            .unwrap_or(0.0);
        println!("Intent: {primary} (confidence {confidence:.2})");
    }

    if let Some(entities) = understanding.get("entities").and_then(|e| e.as_array())
        && !entities.is_empty()
    {
        println!("Entities:");
        for entity in entities {
            println!("  {}", format_entity(entity));
        }
    }

    if let Some(terms) = understanding.get("expansion_terms").and_then(|t| t.as_array())
        && !terms.is_empty()
    {
        let rendered: Vec<&str> = terms.iter().filter_map(|t| t.as_str()).collect();
        println!("Expansion terms: {}", rendered.join(", "));
    }
    if let Some(expanded) = understanding.get("expanded_query").and_then(|e| e.as_str()) {
        println!("Expanded query: {expanded}");
    }
    if let Some(processed) = understanding.get("processed_query").and_then(|p| p.as_str()) {
        println!("Processed query: {processed}");
    }

    if let Some(parameters) = understanding
        .get("search_parameters")
        .and_then(|p| p.as_object())
    {
        if let Some(boost) = parameters.get("boost").and_then(|b| b.as_object())
            && !boost.is_empty()
        {
            let rendered: Vec<String> = boost
                .iter()
                .map(|(field, weight)| {
                    format!("{field}={:.1}", weight.as_f64().unwrap_or(0.0))
                })
                .collect();
            println!("Boosts: {}", rendered.join(", "));
        }
        if let Some(sort) = parameters.get("sort").and_then(|s| s.as_array())
            && !sort.is_empty()
        {
            let rendered: Vec<String> = sort
                .iter()
                .map(|clause| {
                    let field = clause
                        .get("field")
                        .and_then(|f| f.as_str())
                        .unwrap_or("unknown");
                    let order = clause
                        .get("order")
                        .and_then(|o| o.as_str())
                        .unwrap_or("asc");
                    format!("{field} {order}")
                })
                .collect();
            println!("Sort: {}", rendered.join(", "));
        }
        if let Some(filters) = parameters.get("filters").and_then(|f| f.as_object()) {
            let rendered: Vec<String> = filters
                .iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect();
            if !rendered.is_empty() {
                println!("Filters: {}", rendered.join(", "));
            }
        }
    }

    Ok(())
}

/// Render one recognized entity as `type:value (confidence)`.
fn format_entity(entity: &serde_json::Value) -> String {
    let entity_type = entity
        .get("entity_type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown");
    let value = entity.get("value").and_then(|v| v.as_str()).unwrap_or("");
    let confidence = entity
        .get("confidence")
        .and_then(|c| c.as_f64())
        .unwrap_or(0.0);
    format!("{entity_type}:{value} ({confidence:.2})")
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value, _args: &AgoraArgs) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                println!("{key}: {val}");
            }
        }
        _ => println!("{value}"),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &AgoraArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
