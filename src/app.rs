//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, ValidationLevel},
    error::Result,
    logging::{Logger, LoggerFactory},
    models::Config,
    orchestrator::{Orchestrator, ProbeCatalog},
    output::{OutputCoordinator, OutputFormatterFactory},
    types::OutputFormat,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the application.
    ///
    /// Only configuration problems come back as errors. Once the probe
    /// suite has started, every failure is logged and the report is still
    /// printed.
    pub async fn run(self) -> Result<()> {
        if self.cli.should_show_topic_help() {
            print!("{}", self.cli.display_help());
            return Ok(());
        }

        if self.cli.list_probes {
            let format = self.cli.format.unwrap_or(OutputFormat::Text);
            let formatter = OutputFormatterFactory::create_formatter(format, self.cli.use_colors(), false);
            print!("{}", formatter.format_probe_catalog(&ProbeCatalog::standard()?)?);
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;
        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("app").await;

        self.report_configuration(&config, &logger).await?;

        let orchestrator = Orchestrator::from_config(config.clone()).await?;
        let outcome = orchestrator.run().await;

        crate::log_info!(
            logger,
            "Run {} finished in {:.2}s with {} metric(s)",
            outcome.session_id,
            outcome.duration.as_secs_f64(),
            outcome.metrics.len()
        );

        let formatter = OutputFormatterFactory::create_formatter(config.output_format, config.enable_color, config.debug);
        let coordinator = OutputCoordinator::new(formatter)
            .with_summary(config.verbose && config.output_format == OutputFormat::Text);
        print!("{}", coordinator.display_results(&outcome)?);

        Ok(())
    }

    async fn report_configuration(&self, config: &Config, logger: &Logger) -> Result<()> {
        crate::log_debug!(logger, "{} v{} ({})", crate::PKG_NAME, crate::VERSION, crate::TARGET_TRIPLE);
        if config.debug {
            logger
                .debug("Configuration loaded")
                .field("summary", display_config_summary(config))
                .log()
                .await;
        }

        for warning in validate_config(config)? {
            match warning.level {
                ValidationLevel::Warning => logger.warn(&warning.message).log().await,
                ValidationLevel::Info => logger.info(&warning.message).log().await,
            }
        }

        Ok(())
    }
}
