use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use catalog_data::{CatalogIndex, Facet, ProductId};
use query_engine::{format_currency, parse_non_negative, CatalogParams, PanelView, SortKey};
use server::{CatalogService, CatalogSettings, LatestQuery, Outcome, ProductCard};
use store::{open_store, Backend, ProductStore, SellerStore, StoreSettings};

/// Mall - Marketplace catalog browser
#[derive(Parser)]
#[command(name = "mall")]
#[command(about = "Browse, search and benchmark the marketplace catalog", long_about = None)]
struct Cli {
    /// Path to the JSON catalog seed
    #[arg(short, long, default_value = "data/catalog.json")]
    seed: PathBuf,

    /// Store backend (memory or sqlite)
    #[arg(short, long, default_value = "memory")]
    backend: Backend,

    /// SQLite database file (sqlite backend only; in-memory when absent)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Open the store without importing the seed (an existing SQLite file)
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort the catalog like the storefront panel
    Browse {
        /// Category to include (repeatable)
        #[arg(long)]
        category: Vec<String>,

        /// Brand to include (repeatable)
        #[arg(long)]
        brand: Vec<String>,

        #[arg(long, value_parser = parse_price)]
        min_price: Option<f64>,

        #[arg(long, value_parser = parse_price)]
        max_price: Option<f64>,

        /// Minimum rating (0-5)
        #[arg(long, value_parser = parse_rating)]
        rating: Option<f32>,

        /// Only products with stock left
        #[arg(long)]
        in_stock: bool,

        /// Case-insensitive text over name, category and description
        #[arg(long)]
        search: Option<String>,

        /// price-low-high, price-high-low, popularity, latest or featured
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show inline search suggestions for a term
    Suggest {
        term: String,
    },

    /// Show one product with related items
    Product {
        #[arg(long)]
        id: ProductId,
    },

    /// List sellers with their listing counts
    Sellers,

    /// List categories and brands in the seed with product counts
    Facets {
        /// List the products in one category instead
        #[arg(long, conflicts_with = "brand")]
        category: Option<String>,

        /// List the products of one brand instead
        #[arg(long)]
        brand: Option<String>,
    },

    /// Give an existing seller account the admin role
    PromoteAdmin {
        #[arg(long)]
        email: String,
    },

    /// Run random catalog queries to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let store = open_store(&StoreSettings {
        backend: cli.backend,
        path: cli.db.clone(),
        seed: (!cli.no_seed).then(|| cli.seed.clone()),
    })
    .with_context(|| format!("Failed to load catalog from {}", cli.seed.display()))?;
    println!(
        "{} Loaded catalog into {} store in {:?}",
        "✓".green(),
        store.backend_name(),
        start.elapsed()
    );

    let service = CatalogService::new(store.clone(), CatalogSettings::default());

    match cli.command {
        Commands::Browse {
            category,
            brand,
            min_price,
            max_price,
            rating,
            in_stock,
            search,
            sort,
        } => {
            let filters = BrowseFilters {
                category,
                brand,
                min_price,
                max_price,
                rating,
                in_stock,
                search,
                sort,
            };
            handle_browse(&service, filters).await?
        }
        Commands::Suggest { term } => handle_suggest(&service, &term).await?,
        Commands::Product { id } => handle_product(&service, id).await?,
        Commands::Sellers => handle_sellers(store.as_ref())?,
        Commands::Facets { category, brand } => {
            handle_facets(&cli.seed, category.as_deref(), brand.as_deref())?
        }
        Commands::PromoteAdmin { email } => handle_promote_admin(&service, &email).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(service, requests, concurrent).await?,
    }

    Ok(())
}

fn parse_price(raw: &str) -> std::result::Result<f64, String> {
    parse_non_negative(raw).ok_or_else(|| format!("expected a finite, non-negative number, got '{raw}'"))
}

fn parse_rating(raw: &str) -> std::result::Result<f32, String> {
    match parse_price(raw)? {
        value if value <= 5.0 => Ok(value as f32),
        _ => Err(format!("rating must be between 0 and 5, got '{raw}'")),
    }
}

struct BrowseFilters {
    category: Vec<String>,
    brand: Vec<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    rating: Option<f32>,
    in_stock: bool,
    search: Option<String>,
    sort: Option<String>,
}

/// Handle the 'browse' command by replaying the flags as panel events
async fn handle_browse(service: &CatalogService, filters: BrowseFilters) -> Result<()> {
    let mut panel = service.storefront().await?;
    let mut view = panel.refresh();

    match filters.category.as_slice() {
        [] => {}
        // A single category behaves like a `?category=` link: case-insensitive
        [single] => {
            view = panel
                .preselect_category(single)
                .unwrap_or_else(|| panel.toggle_category(single));
        }
        many => {
            for category in many {
                view = panel.toggle_category(category);
            }
        }
    }
    for brand in &filters.brand {
        view = panel.toggle_brand(brand);
    }
    if filters.min_price.is_some() || filters.max_price.is_some() {
        let max = filters.max_price.or(panel.query().max_price);
        view = panel.set_price_range(filters.min_price.unwrap_or(0.0), max);
    }
    if let Some(rating) = filters.rating {
        view = panel.set_min_rating(rating);
    }
    if filters.in_stock {
        view = panel.set_in_stock_only(true);
    }
    if let Some(search) = &filters.search {
        view = panel.set_search(search);
    }
    if let Some(sort) = &filters.sort {
        view = panel.set_sort(SortKey::parse(sort));
    }

    print_view(service, view);
    Ok(())
}

/// Handle the 'promote-admin' command
async fn handle_promote_admin(service: &CatalogService, email: &str) -> Result<()> {
    let seller = service
        .promote_admin(email)
        .await
        .with_context(|| format!("Failed to promote {email}"))?;
    println!(
        "{} {} ({}) is now an admin",
        "✓".green(),
        seller.username.bold(),
        seller.email
    );
    Ok(())
}

/// Handle the 'suggest' command
async fn handle_suggest(service: &CatalogService, term: &str) -> Result<()> {
    let suggestions = service.suggest(term).await?;
    if suggestions.is_empty() {
        println!("No products match '{}'", term);
        return Ok(());
    }

    println!("{}", format!("Suggestions for '{}':", term).bold().blue());
    for suggestion in suggestions {
        println!(
            "  {} {} {} {}",
            format!("#{}", suggestion.id).dimmed(),
            suggestion.name,
            format!("[{}]", suggestion.category).cyan(),
            suggestion.price.green()
        );
    }
    Ok(())
}

/// Handle the 'product' command
async fn handle_product(service: &CatalogService, id: ProductId) -> Result<()> {
    let details = service
        .product_details(id)
        .await?
        .ok_or_else(|| anyhow!("Product {} not found", id))?;

    let card = &details.product;
    let product = &card.product;
    println!("{}", product.name.bold().blue());
    println!("{}Category: {}", "• ".green(), product.category);
    if let Some(brand) = &product.brand {
        println!("{}Brand: {}", "• ".green(), brand);
    }
    if let Some(shop) = &product.shop_name {
        println!(
            "{}Shop: {} ({})",
            "• ".green(),
            shop,
            product.location.as_deref().unwrap_or("unknown location")
        );
    }
    println!("{}Price: {}", "• ".cyan(), price_column(card));
    println!(
        "{}Rating: {} {:.1} ({} reviews)",
        "• ".cyan(),
        card.stars.to_string().yellow(),
        product.rating,
        product.review_count
    );
    println!("{}In stock: {}", "• ".cyan(), product.quantity);
    if let Some(description) = &product.description {
        println!("\n{}", description);
    }

    if !details.related.is_empty() {
        println!("\n{}", "Related products:".bold());
        for related in &details.related {
            println!(
                "  - {} {}",
                related.product.name,
                related.price_label.green()
            );
        }
    }
    Ok(())
}

/// Handle the 'sellers' command
fn handle_sellers<S>(store: &S) -> Result<()>
where
    S: ProductStore + SellerStore + ?Sized,
{
    let sellers = store.list_sellers()?;
    println!("{}", "Sellers:".bold().blue());
    for seller in sellers {
        let stats = store.stats(seller.id)?;
        println!(
            "{}. {} (@{}) [{} / {}] - {} listings, {} published, {} drafts",
            seller.id.to_string().green(),
            seller.business_name,
            seller.username,
            seller.role.as_str(),
            status_label(seller.status.as_str()),
            stats.total,
            stats.published,
            stats.drafts
        );
    }
    Ok(())
}

/// Handle the 'facets' command
fn handle_facets(seed: &Path, category: Option<&str>, brand: Option<&str>) -> Result<()> {
    let index = CatalogIndex::load_from_file(seed).context("Failed to index catalog seed")?;

    let (title, ids) = match (category, brand) {
        (Some(category), _) => (
            format!("Category '{}'", category),
            index.get_products_by_category(category),
        ),
        (None, Some(brand)) => (format!("Brand '{}'", brand), index.get_products_by_brand(brand)),
        (None, None) => {
            print_facets("Categories", &index.categories());
            print_facets("Brands", &index.brands());
            return Ok(());
        }
    };

    println!("{}", format!("{} ({} products):", title, ids.len()).bold().blue());
    for product in ids.iter().filter_map(|id| index.get_product(*id)) {
        println!(
            "  {} {} {}",
            format!("#{}", product.id).dimmed(),
            product.name,
            format_currency(product.price).green()
        );
    }
    Ok(())
}

fn print_facets(title: &str, facets: &[Facet]) {
    println!("{}", format!("{}:", title).bold().blue());
    for facet in facets {
        println!("  {} ({})", facet.value, facet.count.to_string().green());
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: CatalogService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    let service = Arc::new(service);
    let view = Arc::new(LatestQuery::new());
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));

    // Random parameter sets, generated up front
    let params: Vec<CatalogParams> = {
        let mut rng = rand::rng();
        (0..requests).map(|_| random_params(&mut rng)).collect()
    };

    let started = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for params in params {
        let service = service.clone();
        let view = view.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            let outcome = service.query_into(&view, params).await;
            Ok::<_, anyhow::Error>((start.elapsed(), outcome))
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut stale = 0usize;
    let mut failed = 0usize;
    for handle in handles {
        let (elapsed, outcome) = handle.await??;
        timings.push(elapsed);
        match outcome {
            Outcome::Stale => stale += 1,
            Outcome::Failed => failed += 1,
            Outcome::Applied => {}
        }
    }
    let wall = started.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let throughput = requests as f64 / wall.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", wall);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    println!(
        "Rendered generation {} ({} stale results dropped, {} failed)",
        view.snapshot().generation,
        stale,
        failed
    );

    Ok(())
}

fn random_params(rng: &mut impl Rng) -> CatalogParams {
    const CATEGORIES: [&str; 3] = ["Phones", "Laptops", "Accessories"];
    const TERMS: [&str; 4] = ["pro", "samsung", "noise", "ipad"];

    let mut params = CatalogParams {
        sort: Some(SortKey::known()[rng.random_range(0..5)].as_str().to_string()),
        ..Default::default()
    };
    if rng.random_bool(0.5) {
        params.category = Some(CATEGORIES[rng.random_range(0..CATEGORIES.len())].to_string());
    }
    if rng.random_bool(0.3) {
        params.search = Some(TERMS[rng.random_range(0..TERMS.len())].to_string());
    }
    if rng.random_bool(0.3) {
        params.max_price = Some(rng.random_range(200..2000).to_string());
    }
    if rng.random_bool(0.2) {
        params.in_stock = Some("true".to_string());
    }
    params
}

/// Nearest-rank percentile over sorted timings
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = ((sorted.len() as f64 * p).ceil() as usize).clamp(1, sorted.len());
    sorted[rank - 1]
}

fn status_label(status: &str) -> colored::ColoredString {
    match status {
        "active" => status.green(),
        "suspended" => status.red(),
        _ => status.yellow(),
    }
}

fn price_column(card: &ProductCard) -> String {
    let mut column = card.price_label.clone();
    if let Some(percent) = card.discount_percent {
        let badge = format!(" -{}%", percent);
        if card.discount_anomaly.is_some() {
            column.push_str(&format!("{} (check original price)", badge.red()));
        } else {
            column.push_str(&badge.green().to_string());
        }
    }
    column
}

/// Print a panel view as a table of product cards
fn print_view(service: &CatalogService, view: PanelView) {
    println!(
        "{}",
        format!("{} products (sort: {})", view.count, view.query.sort)
            .bold()
            .blue()
    );
    for (rank, product) in view.products.into_iter().enumerate() {
        let card = service.card(product);
        let stock = if card.product.in_stock() {
            format!("{} left", card.product.quantity).normal()
        } else {
            "sold out".red()
        };
        println!(
            "{:>3}. {:<28} {:<12} {:<24} {} {}",
            (rank + 1).to_string().green(),
            card.product.name,
            card.product.category,
            price_column(&card),
            card.stars.to_string().yellow(),
            stock
        );
    }
}
