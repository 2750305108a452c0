use clap::{Args as ClapArgs, Parser, Subcommand};
use pessoa_core::cep::VIACEP_BASE_URL;

#[derive(Parser)]
#[command(name = "pessoa", version, about = "Register and list people")]
pub struct Args {
    /// Base URL of the pessoa API; overrides PESSOA_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Base URL of the postal-code directory
    #[arg(long, global = true, default_value = VIACEP_BASE_URL)]
    pub cep_url: String,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered people, one page at a time
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one person by id or CPF
    Show {
        /// Record id, or an 11-digit CPF (punctuation allowed)
        key: String,
    },
    /// Create a person, or update one with --id
    Save(SaveArgs),
    /// Delete a person after confirmation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Look up the address for a postal code
    Cep { code: String },
}

/// Omitted fields keep their current value when updating.
#[derive(ClapArgs)]
pub struct SaveArgs {
    /// Id of an existing record to update
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    /// Birth date as YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<String>,
    /// Postal code; fills street, city and state when none of them is given
    #[arg(long)]
    pub cep: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
}

impl SaveArgs {
    pub fn wants_autofill(&self) -> bool {
        self.cep.is_some() && self.street.is_none() && self.city.is_none() && self.state.is_none()
    }
}
