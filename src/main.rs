use admission_comparator::analyzer::{AnalysisOutcome, ComparisonAnalyzer, ComparisonRequest};
use admission_comparator::loader::{row_cache, DataLoader, DataSource};
use admission_comparator::models::{Config, Metric, Year};
use admission_comparator::parser::{format_ranking, format_score};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, Command};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("admission-comparator")
        .version("0.1")
        .about("Compares a university program with programs of similar admission range")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("reference")
                .short('r')
                .long("reference")
                .value_name("KEY")
                .help("Program code of the reference program"),
        )
        .arg(
            Arg::new("year")
                .short('y')
                .long("year")
                .value_name("YEAR")
                .value_parser(value_parser!(u16))
                .help("Admission year to compare"),
        )
        .arg(
            Arg::new("metric")
                .short('m')
                .long("metric")
                .value_parser(value_parser!(Metric))
                .help("Compare on national rank or exam score"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let mut config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        Config::default().save_to_file(config_file)?;
        println!(
            "⚠️  Please edit {} and set reference_program_key, then run the program again.",
            config_file
        );
        return Ok(());
    };

    if let Some(reference) = matches.get_one::<String>("reference") {
        config.reference_program_key = reference.clone();
    }
    if let Some(year) = matches.get_one::<Year>("year") {
        config.year = *year;
    }
    if let Some(metric) = matches.get_one::<Metric>("metric") {
        config.metric = *metric;
    }

    if config.reference_program_key.is_empty() {
        println!("❌ Error: reference_program_key is empty in configuration file");
        println!("   Please edit {} or pass --reference", config_file);
        return Ok(());
    }

    let output_dir = config.output_directory.as_deref().unwrap_or("output");
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;
    clean_output_directory(output_dir)?;

    let source = DataSource::from_config(&config)?;
    println!("🔍 Comparing program {} for {}", config.reference_program_key, config.year);
    println!("📂 Data source: {:?}", source);
    println!("📄 Output directory: {} (cleaned)", output_dir);

    let loader = DataLoader::new(source, row_cache(Duration::from_secs(config.cache_ttl_secs)));
    let programs = loader
        .load_programs(&config.programs_file, &config.supported_years)
        .await
        .with_context(|| format!("Failed to load programs from {}", config.programs_file))?;
    println!("   ✅ Loaded {} program records", programs.len());

    let prices = loader
        .load_prices(&config.prices_file, &config.price_years)
        .await
        .with_context(|| format!("Failed to load prices from {}", config.prices_file))?;
    println!("   ✅ Loaded {} price entries", prices.len());

    let preferences = match &config.preferences_file {
        Some(file) => match loader.load_preferences(file).await {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!(error = %e, "preference data unavailable, preference filters disabled");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let analyzer = ComparisonAnalyzer::new(&programs, &prices, &preferences);
    let request = ComparisonRequest::from_config(&config);
    let outcome = analyzer.analyze(&request)?;

    generate_ranked_csv(&outcome, config.metric, output_dir)?;
    generate_chart_csv(&outcome, output_dir)?;
    generate_summary(&outcome, &config, output_dir)?;

    print_summary(&outcome, &config);

    println!("\n✅ Comparison complete!");
    println!("📂 Results: {}", output_dir);
    Ok(())
}

fn format_bound(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Rank => format_ranking(Some(value)),
        Metric::Score => format_score(Some(value)),
    }
}

fn optional_number(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn generate_ranked_csv(outcome: &AnalysisOutcome<'_>, metric: Metric, output_dir: &str) -> Result<()> {
    use csv::Writer;

    let csv_path = Path::new(output_dir).join("ranked_programs.csv");
    let mut writer = Writer::from_path(csv_path)?;

    writer.write_record([
        "Position",
        "Program Code",
        "University",
        "University Type",
        "Program",
        "Min",
        "Max",
        "Capacity",
        "Placed",
        "Fulfillment %",
        "Price",
        "Price Index",
        "Range Corrected",
        "Range Padded",
    ])?;

    for (position, program) in outcome.ranked.iter().enumerate() {
        let record = program.record;
        writer.write_record([
            (position + 1).to_string(),
            record.program_key.clone(),
            record.university.clone(),
            record
                .university_type
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            record.display_name(),
            format_bound(metric, program.min),
            format_bound(metric, program.max),
            optional_number(program.capacity),
            optional_number(program.placed),
            format!("{:.1}", program.fulfillment_rate),
            format!("{:.0}", program.price),
            program
                .price_index
                .map(|index| format!("{:.2}", index))
                .unwrap_or_default(),
            program.range_corrected.to_string(),
            program.range_padded.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn generate_chart_csv(outcome: &AnalysisOutcome<'_>, output_dir: &str) -> Result<()> {
    use csv::Writer;

    let chart = &outcome.chart;
    let mut writer = Writer::from_path(Path::new(output_dir).join("chart_data.csv"))?;
    writer.write_record([
        "Label", "Min", "Max", "Fulfillment %", "Capacity", "Placed", "Price", "Color",
    ])?;

    for i in 0..chart.len() {
        let point = &chart.data_points[i];
        writer.write_record([
            chart.labels[i].clone(),
            point.min.to_string(),
            point.max.to_string(),
            format!("{:.1}", point.fulfillment_rate),
            optional_number(point.capacity),
            optional_number(point.placed),
            chart.price_points[i].to_string(),
            chart.colors[i].clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn generate_summary(outcome: &AnalysisOutcome<'_>, config: &Config, output_dir: &str) -> Result<()> {
    let mut content = String::new();
    content.push_str("Program Comparison Summary\n");
    content.push_str("==========================\n\n");
    content.push_str(&format!(
        "Reference: {} - {} ({})\n",
        outcome.reference.university,
        outcome.reference.display_name(),
        outcome.reference.program_key
    ));
    content.push_str(&format!("Year: {}\nMetric: {:?}\nSort: {:?}\n\n", config.year, config.metric, config.sort_by));

    match &outcome.window {
        Some(window) => content.push_str(&format!(
            "Window: {} - {}{}\n",
            format_bound(config.metric, window.min),
            format_bound(config.metric, window.max),
            if window.is_user_overridden { " (adjusted)" } else { "" }
        )),
        None => content.push_str("Window: no admission data for the reference program\n"),
    }

    content.push_str(&format!(
        "Similar programs: {} (chart shows {})\n",
        outcome.total_before_limit,
        outcome.chart.len()
    ));
    if let Some(average) = outcome.own_average_price {
        content.push_str(&format!("Own average price: {:.0}\n", average));
    }

    if !outcome.scholarship_counts.is_empty() {
        content.push_str("\nScholarship distribution:\n");
        for (label, count) in &outcome.scholarship_counts {
            let label = if label.is_empty() { "-" } else { label.as_str() };
            content.push_str(&format!("   - {}: {}\n", label, count));
        }
    }

    if !outcome.corrected_keys.is_empty() {
        content.push_str("\nRecords with floor above ceiling (swapped):\n");
        for key in &outcome.corrected_keys {
            content.push_str(&format!("   - {}\n", key));
        }
    }

    fs::write(Path::new(output_dir).join("summary.txt"), content)?;
    Ok(())
}

fn print_summary(outcome: &AnalysisOutcome<'_>, config: &Config) {
    println!("\n📊 SUMMARY");
    println!("==========\n");

    let Some(window) = &outcome.window else {
        println!("❌ Reference program has no {:?} data for {}", config.metric, config.year);
        return;
    };

    println!(
        "🎯 Window: {} - {}",
        format_bound(config.metric, window.min),
        format_bound(config.metric, window.max)
    );
    println!("📈 Similar programs ({} total):", outcome.total_before_limit);
    for (i, program) in outcome.ranked.iter().take(config.record_limit.max(1)).enumerate() {
        println!(
            "   {}. {} - {} [{} - {}] doluluk {:.1}%",
            i + 1,
            program.record.university,
            program.record.display_name(),
            format_bound(config.metric, program.min),
            format_bound(config.metric, program.max),
            program.fulfillment_rate
        );
    }
    if !outcome.corrected_keys.is_empty() {
        println!("⚠️  {} records had floor above ceiling and were swapped", outcome.corrected_keys.len());
    }
}

fn clean_output_directory(output_dir: &str) -> Result<()> {
    let output_path = Path::new(output_dir);

    if !output_path.exists() {
        return Ok(());
    }

    println!("🧹 Cleaning previous results...");

    let items_to_clean = ["ranked_programs.csv", "chart_data.csv", "summary.txt"];

    for item in &items_to_clean {
        let item_path = output_path.join(item);
        if item_path.is_file() {
            fs::remove_file(&item_path)
                .with_context(|| format!("Failed to remove {}", item_path.display()))?;
            println!("   🗑️  Removed file: {}", item);
        }
    }

    println!("   ✅ Output directory cleaned");
    Ok(())
}
