use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use pessoa_core::{
    format_city_state, format_tax_id, AddressField, ApiClient, ClientConfig, Field, NoticeLevel, Person,
    PersonApi, PersonForm, PersonId, PersonService, PostalLookup, RowView, TableView, ViaCepClient,
};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{Args, Commands, SaveArgs};

type Form<'a> = PersonForm<PersonService, &'a ViaCepClient>;

const TAX_ID_DIGITS: usize = 11;

/// Log level used when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let default_level = default_level(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Initial load; a failed load ends the command with the banner text.
fn load(form: &mut Form<'_>) -> Result<()> {
    form.mount();
    match form.last_error() {
        Some(banner) => bail!("{banner}"),
        None => Ok(()),
    }
}

/// Print the newest notice; an error notice fails the command.
fn report(form: &Form<'_>) -> Result<()> {
    match form.active_notices(Instant::now()).last() {
        Some(notice) if notice.level == NoticeLevel::Error => bail!("{}", notice.message),
        Some(notice) => {
            println!("{}", notice.message);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_rows(rows: &[RowView]) {
    println!("{:<36}  {:<28}  {:<14}  {:<10}  LOCATION", "ID", "NAME", "CPF", "BORN");
    for row in rows {
        println!(
            "{:<36}  {:<28}  {:<14}  {:<10}  {}",
            row.id, row.name, row.tax_id, row.birth_date, row.location
        );
    }
}

fn print_person(person: &Person) {
    let address = &person.address;
    println!("id:       {}", person.id);
    println!("name:     {}", person.name);
    println!("cpf:      {}", format_tax_id(&person.tax_id));
    println!("born:     {}", person.birth_date);
    println!("cep:      {}", address.postal_code);
    println!("street:   {} {}", address.street, address.number);
    println!("location: {}", format_city_state(&address.city, &address.state));
}

fn list(form: &mut Form<'_>, page: usize) -> Result<()> {
    load(form)?;
    form.select_page(page);
    match form.table_view() {
        TableView::Loading => {}
        TableView::Empty { message } => println!("{message}"),
        TableView::Rows {
            rows,
            pages,
            current_page,
        } => {
            print_rows(&rows);
            println!("page {current_page} of {}", pages.len());
        }
    }
    Ok(())
}

/// An 11-digit key (dots and dashes allowed) is a CPF, anything else an id.
fn fetch(api: &impl PersonApi, key: &str) -> Result<Person> {
    let digits: String = key.chars().filter(|c| !matches!(c, '.' | '-')).collect();
    let person = if digits.len() == TAX_ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        api.get_by_tax_id(&digits)?
    } else {
        api.get_by_id(&PersonId::new(key))?
    };
    Ok(person)
}

fn show(api: &impl PersonApi, key: &str) -> Result<()> {
    print_person(&fetch(api, key)?);
    Ok(())
}

fn save(form: &mut Form<'_>, args: SaveArgs) -> Result<()> {
    load(form)?;
    if let Some(id) = &args.id {
        let id = PersonId::new(id.as_str());
        if !form.begin_edit(&id) {
            bail!("no person with id {id}");
        }
    }

    let autofill = args.wants_autofill();
    let edits = [
        (Field::Name, args.name),
        (Field::TaxId, args.cpf),
        (Field::BirthDate, args.birth_date),
        (Field::Address(AddressField::PostalCode), args.cep),
        (Field::Address(AddressField::Street), args.street),
        (Field::Address(AddressField::Number), args.number),
        (Field::Address(AddressField::City), args.city),
        (Field::Address(AddressField::State), args.state),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            form.edit_field(field, value);
        }
    }
    if autofill && !form.autofill_address() {
        eprintln!("No address found for postal code {}", form.draft().address.postal_code);
    }

    form.submit();
    report(form)?;
    if let Some(saved) = form.records().last() {
        print_person(saved);
    }
    Ok(())
}

fn confirm(person: Option<&Person>) -> Result<bool> {
    let Some(person) = person else {
        return Ok(false);
    };
    let prompt = format!("Delete {} ({})?", person.name, format_tax_id(&person.tax_id));
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("could not read the delete confirmation")
}

fn delete(form: &mut Form<'_>, id: &PersonId, yes: bool) -> Result<()> {
    load(form)?;
    if !form.request_delete(id) {
        bail!("no person with id {id}");
    }
    if !yes && !confirm(form.pending_delete())? {
        form.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }
    form.confirm_delete();
    report(form)
}

fn cep(lookup: &impl PostalLookup, code: &str) -> Result<()> {
    let fragment = lookup.lookup(code)?;
    println!("street:   {}", fragment.street);
    println!("location: {}", format_city_state(&fragment.city, &fragment.state));
    Ok(())
}

fn main() -> Result<()> {
    // A missing .env is fine; the variables may come from the shell.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.api_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    tracing::debug!(base_url = %config.base_url, "using pessoa api");

    let directory = ViaCepClient::with_client(ApiClient::new(ClientConfig::new(&args.cep_url)));
    let mut form: Form<'_> = PersonForm::new(PersonService::new(config), &directory);

    match args.command {
        Some(Commands::List { page }) => list(&mut form, page)?,
        Some(Commands::Show { key }) => show(form.api(), &key)?,
        Some(Commands::Save(save_args)) => save(&mut form, save_args)?,
        Some(Commands::Delete { id, yes }) => delete(&mut form, &PersonId::new(id), yes)?,
        Some(Commands::Cep { code }) => cep(&directory, &code)?,
        None => println!("Run with --help to see instructions"),
    }

    Ok(())
}
