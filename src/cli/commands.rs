//! Command implementations for the Agora CLI.

use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::document::{Document, EntityKind};
use crate::error::{AgoraError, Result};
use crate::scoring::personalize::{MemoryProfileStore, NoProfiles};
use crate::search::engine::SearchEngine;
use crate::search::gateway::MemoryIndexGateway;
use crate::search::request::{EntityScope, MultiEntitySearchRequest};
use crate::understanding::parameters::{SortClause, SortOrder};
use crate::understanding::understander::QueryUnderstander;

/// Queries exercised by the `demo` command.
pub const DEMO_QUERIES: [&str; 10] = [
    "sustainable dress under $100",
    "organic cotton t-shirts by eco collective",
    "vegan leather bags with good reviews",
    "recycled denim jeans size 32",
    "fair trade coffee from local brands",
    "compare bamboo and recycled plastic toothbrushes",
    "sort eco-friendly cleaning products by price low to high",
    "black dress with sustainable materials for summer",
    "handmade jewelry from small batch brands",
    "best rated organic skincare products under $50",
];

/// Execute a CLI command.
pub fn execute_command(args: AgoraArgs) -> Result<()> {
    match &args.command {
        Command::Analyze(analyze_args) => analyze_query(analyze_args.clone(), &args),
        Command::Search(search_args) => search_catalog(search_args.clone(), &args),
        Command::Demo(demo_args) => run_demo(demo_args.clone(), &args),
    }
}

/// Run query understanding and print the analysis.
fn analyze_query(args: AnalyzeArgs, cli_args: &AgoraArgs) -> Result<()> {
    let understander = QueryUnderstander::new();
    let outcome = understander.process(&args.query);
    let report = AnalysisReport::from_understanding(&args.query, outcome);

    output_result("Query analysis", &report, cli_args)
}

/// Search a catalog file.
fn search_catalog(args: SearchArgs, cli_args: &AgoraArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Loading catalog: {}", args.catalog_file.display());
    }
    let gateway = MemoryIndexGateway::load_from_file(&args.catalog_file)?;
    if cli_args.verbosity() > 1 {
        println!("Catalog documents: {}", gateway.len());
    }

    let profiles = match &args.profiles {
        Some(path) => MemoryProfileStore::load_from_file(path)?,
        None => MemoryProfileStore::new(),
    };
    let engine = SearchEngine::new(gateway, profiles, EngineConfig::default())?;
    let request = build_request(&args)?;

    let started = Instant::now();
    let response = runtime()?.block_on(engine.search(&request))?;
    let report = SearchReport {
        duration_ms: started.elapsed().as_millis() as u64,
        response,
    };

    output_result("Search results", &report, cli_args)
}

/// Run the built-in demo queries against a catalog.
fn run_demo(args: DemoArgs, cli_args: &AgoraArgs) -> Result<()> {
    let gateway = match &args.catalog_file {
        Some(path) => MemoryIndexGateway::load_from_file(path)?,
        None => MemoryIndexGateway::with_documents(sample_catalog()),
    };
    if cli_args.verbosity() > 1 {
        println!("Demo catalog documents: {}", gateway.len());
        println!();
    }

    let engine = SearchEngine::new(gateway, NoProfiles, EngineConfig::default())?;
    let runtime = runtime()?;

    for (i, query) in DEMO_QUERIES.iter().enumerate() {
        let request = MultiEntitySearchRequest::new(*query)
            .with_scope(EntityScope::All)
            .with_nlp(true)
            .with_highlighting(true);

        let started = Instant::now();
        let response = runtime.block_on(engine.search(&request))?;
        let report = SearchReport {
            duration_ms: started.elapsed().as_millis() as u64,
            response,
        };
        let header = format!("Demo {}/{}: {query}", i + 1, DEMO_QUERIES.len());
        output_result(&header, &report, cli_args)?;

        if cli_args.verbosity() > 0 {
            println!();
        }
    }

    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Translate CLI search arguments into an engine request.
fn build_request(args: &SearchArgs) -> Result<MultiEntitySearchRequest> {
    let mut request = MultiEntitySearchRequest::new(args.query.clone())
        .with_scope(args.scope.into())
        .with_page(args.page, args.limit)
        .with_nlp(!args.no_nlp)
        .with_highlighting(args.highlight);
    request.boost_by_values = !args.no_value_boost;
    for raw in &args.sort {
        request.sort.push(parse_sort_clause(raw)?);
    }
    if let Some(user_id) = &args.user_id {
        request = request.with_personalization(user_id.clone(), args.personalization_strength);
    }
    Ok(request)
}

/// Parse a `field:asc` / `field:desc` clause. A bare field name sorts
/// ascending.
fn parse_sort_clause(raw: &str) -> Result<SortClause> {
    let (field, order) = match raw.split_once(':') {
        Some((field, order)) => (field, order),
        None => (raw, "asc"),
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(AgoraError::invalid_request(format!(
            "empty sort field in '{raw}'"
        )));
    }
    let order = match order.trim() {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => {
            return Err(AgoraError::invalid_request(format!(
                "unknown sort order '{other}' in '{raw}'"
            )));
        }
    };
    Ok(SortClause::new(field, order))
}

/// Catalog used by the demo when no file is given.
pub fn sample_catalog() -> Vec<Document> {
    vec![
        Document::builder(EntityKind::Product)
            .id("p-wrap-dress")
            .name("Organic Cotton Wrap Dress")
            .description("A sustainable wrap dress in soft organic cotton, made for summer")
            .category("dresses")
            .brand("EverGreen Basics")
            .value("sustainable")
            .value("organic")
            .color("black")
            .material("organic cotton")
            .size("S")
            .size("M")
            .size("L")
            .style("casual")
            .price(89.0)
            .rating(4.6)
            .review_count(214)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-linen-dress")
            .name("Linen Midi Dress")
            .description("Breezy linen midi dress for warm days")
            .category("dresses")
            .brand("Atelier Nord")
            .color("white")
            .material("linen")
            .size("M")
            .price(120.0)
            .rating(4.2)
            .review_count(58)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-organic-tee")
            .name("Organic Cotton T-Shirt")
            .description("Classic organic cotton tee with a relaxed fit")
            .category("shirts")
            .brand("Eco Collective")
            .value("organic")
            .value("sustainable")
            .color("white")
            .color("black")
            .material("organic cotton")
            .size("S")
            .size("M")
            .size("L")
            .size("XL")
            .price(25.0)
            .rating(4.4)
            .review_count(890)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-vegan-tote")
            .name("Vegan Leather Tote")
            .description("Roomy vegan leather tote bag with recycled lining")
            .category("bags")
            .brand("Mara & Co")
            .value("vegan")
            .value("recycled")
            .color("black")
            .material("vegan leather")
            .price(75.0)
            .rating(4.7)
            .review_count(1203)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-loop-jeans")
            .name("Recycled Denim Jeans")
            .description("High-rise jeans cut from recycled denim")
            .category("jeans")
            .brand("Blue Loop")
            .value("recycled")
            .value("sustainable")
            .color("blue")
            .material("denim")
            .material("recycled denim")
            .size("30")
            .size("32")
            .size("34")
            .price(95.0)
            .rating(4.3)
            .review_count(412)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-fair-coffee")
            .name("Fair Trade Coffee Beans")
            .description("Medium roast fair trade coffee from a local cooperative")
            .category("coffee")
            .brand("Morning Collective")
            .value("fair trade")
            .value("local")
            .price(14.5)
            .rating(4.8)
            .review_count(2310)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-bamboo-brush")
            .name("Bamboo Toothbrush")
            .description("Compostable bamboo toothbrush with soft bristles")
            .category("toothbrushes")
            .brand("Tidy Planet")
            .value("sustainable")
            .material("bamboo")
            .price(4.5)
            .rating(4.1)
            .review_count(95)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-recycled-brush")
            .name("Recycled Plastic Toothbrush")
            .description("Toothbrush with a handle made of recycled plastic")
            .category("toothbrushes")
            .brand("Tidy Planet")
            .value("recycled")
            .material("recycled plastic")
            .price(3.9)
            .rating(4.0)
            .review_count(67)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-surface-cleaner")
            .name("Eco-Friendly Surface Cleaner")
            .description("Plant-based cleaning spray for kitchens and counters")
            .category("cleaning")
            .brand("Pure Home")
            .value("eco-friendly")
            .price(8.0)
            .rating(4.5)
            .review_count(640)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-citrus-cleaner")
            .name("Citrus Cleaning Concentrate")
            .description("Concentrated eco-friendly cleaner refill, one bottle makes five")
            .category("cleaning")
            .brand("Pure Home")
            .value("eco-friendly")
            .value("sustainable")
            .price(12.0)
            .rating(4.6)
            .review_count(311)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-brass-earrings")
            .name("Handmade Brass Earrings")
            .description("Small batch earrings handmade from recycled brass")
            .category("jewelry")
            .brand("Studio Luz")
            .value("handmade")
            .value("recycled")
            .price(38.0)
            .rating(4.9)
            .review_count(156)
            .build(),
        Document::builder(EntityKind::Product)
            .id("p-face-serum")
            .name("Organic Face Serum")
            .description("Organic skincare serum with cold-pressed oils")
            .category("skincare")
            .brand("Botanica")
            .value("organic")
            .value("vegan")
            .price(42.0)
            .rating(4.8)
            .review_count(1785)
            .build(),
        Document::builder(EntityKind::Brand)
            .id("b-eco-collective")
            .name("Eco Collective")
            .description("Organic basics brand focused on sustainable cotton")
            .category("shirts")
            .value("organic")
            .value("sustainable")
            .rating(4.5)
            .build(),
        Document::builder(EntityKind::Brand)
            .id("b-blue-loop")
            .name("Blue Loop")
            .description("Denim label working with recycled fibers")
            .category("jeans")
            .value("recycled")
            .rating(4.2)
            .build(),
        Document::builder(EntityKind::Brand)
            .id("b-studio-luz")
            .name("Studio Luz")
            .description("Small batch jewelry studio, every piece handmade")
            .category("jewelry")
            .value("handmade")
            .rating(4.8)
            .build(),
        Document::builder(EntityKind::Merchant)
            .id("m-green-market")
            .name("Green Market")
            .description("Marketplace shop for sustainable home goods")
            .category("cleaning")
            .category("coffee")
            .value("sustainable")
            .value("local")
            .rating(4.4)
            .build(),
        Document::builder(EntityKind::Merchant)
            .id("m-fair-goods")
            .name("Fair Goods Co")
            .description("Fair trade goods sourced from local producers")
            .category("coffee")
            .value("fair trade")
            .value("local")
            .rating(4.7)
            .build(),
    ]
}
