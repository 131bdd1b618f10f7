fn main() -> anyhow::Result<()> {
    nsrouter::cli::run_cli()
}
