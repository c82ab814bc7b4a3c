use std::sync::Arc;

use clap::{Parser, Subcommand};

use climascope_core::{
    Config, HttpWeatherService, InputForm, RequestOrchestrator, SearchMode, ViewStateStore,
    geolocate,
};

use crate::interactive;
use crate::output::{self, TerminalViewport};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climascope", version, about = "Historical rain likelihood for a place and date")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a free-text question, e.g. "Will it rain in Neeloor on September 2nd?".
    Ask {
        /// The question text.
        text: String,
    },

    /// Look up a location name and date.
    Show {
        /// Location name, e.g. "Paris, France".
        location: String,

        /// Date as YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },

    /// Query the configured home coordinate for a date.
    Here {
        /// Date as YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },

    /// Configure the service endpoint and home coordinate.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => interactive::configure(),
            Some(Command::Ask { text }) => App::from_config()?.ask(text).await,
            Some(Command::Show { location, date }) => App::from_config()?.show(location, date).await,
            Some(Command::Here { date }) => App::from_config()?.here(date).await,
            None => {
                let mut app = App::from_config()?;
                interactive::session(&mut app).await
            }
        }
    }
}

/// Wires the core components together for one CLI session.
pub struct App {
    store: Arc<ViewStateStore>,
    orchestrator: RequestOrchestrator,
    form: InputForm,
}

impl App {
    pub fn from_config() -> anyhow::Result<Self> {
        let config = Config::load()?;
        let service = HttpWeatherService::new(config.base_url())?;
        let location = geolocate::from_config(&config);
        let store = Arc::new(ViewStateStore::new(Box::new(TerminalViewport)));
        let orchestrator =
            RequestOrchestrator::new(Box::new(service), location, Arc::clone(&store));

        Ok(Self {
            store,
            orchestrator,
            form: InputForm::new(),
        })
    }

    pub fn form(&self) -> &InputForm {
        &self.form
    }

    pub async fn ask(&mut self, text: String) -> anyhow::Result<()> {
        self.store.set_mode(SearchMode::Prompt);
        self.form.set_prompt_text(text);
        println!("Analyzing and fetching data...");
        self.orchestrator.submit_prompt(&self.form).await;
        self.finish()
    }

    pub async fn show(&mut self, location: String, date: String) -> anyhow::Result<()> {
        self.store.set_mode(SearchMode::Manual);
        self.form.set_location_text(location);
        self.form.set_date(date);
        println!("Analyzing and fetching data...");
        self.orchestrator.submit_manual(&self.form).await;
        self.finish()
    }

    pub async fn here(&mut self, date: String) -> anyhow::Result<()> {
        self.form.set_date(date);
        println!("Analyzing and fetching data...");
        self.orchestrator.submit_current_location(&mut self.form).await;
        self.finish()
    }

    /// Render the committed outcome of the submission that just ran.
    fn finish(&self) -> anyhow::Result<()> {
        let state = self.store.snapshot();
        if let Some(result) = state.request.result() {
            output::print_result(result);
            return Ok(());
        }
        if let Some(message) = state.request.error() {
            anyhow::bail!("{message}");
        }
        Ok(())
    }
}
