use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use shared::{
    build_keywords, plan_dispatch, Config, Dispatch, FetchParams, LlmProvider, Mailer,
    NewsApiClient, OllamaCurator,
};

#[derive(Parser)]
#[command(name = "send-digest")]
#[command(about = "Fetch recent U.S. Treasury news, curate it with an LLM, and email the digest")]
struct Args {
    /// Print the digest to stdout instead of sending email
    #[arg(long)]
    dry_run: bool,

    /// Override the lookback window in days
    #[arg(short, long)]
    days: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let dry_run = args.dry_run || config.dry_run;
    let lookback_days = args.days.unwrap_or(config.lookback_days);

    let keywords = build_keywords(&config.query, config.max_keywords);
    if config.debug {
        eprintln!("Search keywords: {:?}", keywords);
    }

    println!("📰 Fetching U.S. Treasury news from the past {} day(s)...", lookback_days);
    let news_client = NewsApiClient::new(config.news_api_key.clone())?;
    let params = FetchParams {
        keywords,
        language: "eng".to_string(),
        lookback_days,
        allow_domains: config.allow_domains.clone(),
        max_articles: config.max_articles,
        debug: config.debug,
        verify_empty_results: config.verify_empty_results,
    };
    let articles = news_client
        .fetch_articles(&params)
        .await
        .context("Failed to fetch news articles")?;
    println!("✓ Collected {} article(s)", articles.len());

    println!("\n🤖 Curating digest with {}...", config.ollama_model);
    let curator = match config.llm_provider {
        LlmProvider::Ollama => OllamaCurator::new(
            config.ollama_base_url.clone(),
            config.ollama_model.clone(),
            config.llm_temperature,
            config.llm_max_tokens,
            config.llm_timeout_seconds,
        )?,
    };
    let digest = curator
        .curate(&articles)
        .await
        .context("Failed to curate digest")?;

    let digest = match plan_dispatch(digest, dry_run) {
        Dispatch::Print(digest) => {
            println!("\n{}", digest);
            return Ok(());
        }
        Dispatch::Send(digest) => digest,
    };

    println!("\n✉️ Sending digest to {} recipient(s)...", config.to_emails.len());
    let subject = shared::renderer::subject_line(Local::now());
    let html_body = shared::renderer::markdown_to_basic_html(&digest);
    let message = Mailer::build_message(
        &subject,
        &config.from_email,
        &config.to_emails,
        digest,
        html_body,
    )?;

    let mailer = Mailer::from_config(&config);
    mailer.send(message).await?;

    println!("✓ Digest sent");

    Ok(())
}
