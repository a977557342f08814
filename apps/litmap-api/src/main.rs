use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = litmap_api::Args::parse();

	litmap_api::run(args).await
}
