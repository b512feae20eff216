use clap::{Arg, ArgAction, Command};
use fakecheck_i18n::{Params, PhraseCatalog};
use fakecheck_verify::{
    Classifier, GeminiProvider, GoogleCustomSearch, MockClassifier, MockMode, Verification,
    Verifier, VerifyError, WebSearch,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("fakecheck")
        .version("0.1.0")
        .about("Assess the credibility of a news text")
        .arg(
            Arg::new("text")
                .help("Text to verify")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the offline simulated classifier instead of Gemini")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-search")
                .long("no-search")
                .help("Skip the web search cross-check for recent events")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Language for headings and labels (default: pt)")
                .default_value("pt"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the verification record as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log provider requests and fallbacks")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .init();

    let text = matches.get_one::<String>("text").map(String::as_str).unwrap_or_default();
    let lang = matches.get_one::<String>("lang").map(String::as_str).unwrap_or("pt");
    let catalog = PhraseCatalog::builtin();
    let tr = |phrase: &str| catalog.translate(phrase, lang, &Params::new());

    let classifier: Arc<dyn Classifier> = if matches.get_flag("mock") {
        Arc::new(MockClassifier::new(MockMode::Simulated))
    } else {
        match GeminiProvider::from_env() {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                eprintln!("❌ {}", e);
                eprintln!("   Set it with: export GEMINI_API_KEY=your_api_key");
                eprintln!("   Or use --mock to use the simulated classifier");
                std::process::exit(1);
            }
        }
    };

    let mut verifier = Verifier::new(classifier);
    if !matches.get_flag("no-search") {
        match GoogleCustomSearch::from_env() {
            Ok(search) => verifier = verifier.with_search(Arc::new(search) as Arc<dyn WebSearch>),
            Err(e) => tracing::debug!("Search disabled: {}", e),
        }
    }

    let verification = match verifier.verify(text, None).await {
        Ok(verification) => verification,
        Err(VerifyError::InvalidInput(errors)) => {
            for error in errors {
                eprintln!("❌ {}", tr(&error));
            }
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&verification)?);
        return Ok(());
    }

    print_report(&verification, &tr);
    Ok(())
}

fn print_report(verification: &Verification, tr: &dyn Fn(&str) -> String) {
    let analysis = &verification.analysis;

    println!("🔎 {}", tr("Resultado da Análise"));
    println!(
        "   {} ({}%)",
        tr(analysis.verdict().label()),
        analysis.score_percentage()
    );
    if !analysis.score_explanation.is_empty() {
        println!("   {}", analysis.score_explanation);
    }
    println!();

    let sections = [
        ("✅", "Elementos Verificados", &analysis.true_elements),
        ("❌", "Elementos Falsos", &analysis.false_elements),
        ("⚠️ ", "Pontos Suspeitos", &analysis.suspicious_elements),
        ("💡", "Recomendações", &analysis.recommendations),
    ];
    for (icon, heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("{} {}", icon, tr(heading));
        for item in items {
            println!("   - {}", item);
        }
        println!();
    }

    if !analysis.detailed_analysis.is_empty() {
        println!("📄 {}", tr("Análise Detalhada"));
        println!("   {}", analysis.detailed_analysis);
        println!();
    }

    for warning in &verification.warnings {
        eprintln!("⚠️  {}", tr(warning));
    }
    if let Some(notice) = &verification.notice {
        eprintln!("🌐 {}", tr(notice));
    }
}
