use anyhow::{Context, Result};
use catalog_filter::{CatalogView, FilterCriteria, Visible};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use phone_records::{ContactSubmission, DashboardStats, Inquiry, Phone, SpecificRequest};
use record_store::{
    InMemoryStore, RecordStore, RestSessionProvider, RestStore, Session, StaticSessionProvider,
    StoreConfig, StoreRoleChecker,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use storefront::{
    ContactForm, FEATURED_LIMIT, InquiryForm, LoadOutcome, NewPhoneForm, Notice, RequestForm,
    Severity, SoldFilter, Storefront, StorefrontError,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Phone Shop - used phone storefront and back office
#[derive(Parser)]
#[command(name = "phone-shop")]
#[command(about = "Browse the used phone catalog and manage the shop", long_about = None)]
struct Cli {
    /// JSON data file to serve from memory instead of the hosted store.
    /// Successful writes are saved back to it.
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Hosted store base url
    #[arg(long, env = "STORE_URL", global = true)]
    store_url: Option<String>,

    /// Hosted store project key
    #[arg(long, env = "STORE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Access token of the signed-in user
    #[arg(long, env = "STORE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// With --data-file, act as this signed-in user. Admin commands still
    /// require an admin row for the user in `user_roles`.
    #[arg(long, global = true)]
    as_user: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List phones in the catalog
    Browse {
        /// Case-insensitive text matched against model and brand
        #[arg(long, default_value = "")]
        search: String,

        /// Brand name, or "all"
        #[arg(long, default_value = "all")]
        brand: String,

        /// Condition label (Excellent, Good, Fair, Like New), or "all"
        #[arg(long, default_value = "all")]
        condition: String,

        /// Price bucket "min-max", or "all"
        #[arg(long, default_value = "all")]
        price: String,

        /// Include phones already sold
        #[arg(long)]
        include_sold: bool,
    },

    /// Newest available phones, as on the home page
    Featured {
        #[arg(long, default_value_t = FEATURED_LIMIT)]
        limit: usize,
    },

    /// Show one phone in detail
    Show {
        #[arg(long)]
        id: Uuid,
    },

    /// Ask about a listed phone
    Inquire {
        #[arg(long)]
        phone_id: Uuid,

        #[command(flatten)]
        contact: ContactDetails,

        #[arg(long)]
        message: Option<String>,
    },

    /// Ask the shop to source a model
    Request {
        #[command(flatten)]
        contact: ContactDetails,

        /// Model you are looking for
        #[arg(long)]
        model: String,

        #[arg(long)]
        budget: Option<f64>,

        #[arg(long)]
        message: Option<String>,
    },

    /// Send a message to the shop
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        message: String,
    },

    /// Back office (requires the admin role)
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Args)]
struct ContactDetails {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Inventory and submission counts
    Stats,
    /// All phones, sold included
    Phones,
    /// Add a phone listing
    Add(AddPhoneArgs),
    /// Flip a phone between sold and available
    ToggleSold {
        #[arg(long)]
        id: Uuid,
    },
    DeletePhone {
        #[arg(long)]
        id: Uuid,
    },
    /// Customer inquiries, newest first
    Inquiries,
    /// Phone requests, newest first
    Requests,
    /// Contact messages, newest first
    Contacts,
    DeleteInquiry {
        #[arg(long)]
        id: Uuid,
    },
    DeleteRequest {
        #[arg(long)]
        id: Uuid,
    },
    DeleteContact {
        #[arg(long)]
        id: Uuid,
    },
    SignOut,
}

impl Commands {
    /// Whether the command writes to the store
    fn is_mutating(&self) -> bool {
        match self {
            Commands::Inquire { .. } | Commands::Request { .. } | Commands::Contact { .. } => true,
            Commands::Admin(command) => command.is_mutating(),
            Commands::Browse { .. } | Commands::Featured { .. } | Commands::Show { .. } => false,
        }
    }
}

impl AdminCommands {
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            AdminCommands::Add(_)
                | AdminCommands::ToggleSold { .. }
                | AdminCommands::DeletePhone { .. }
                | AdminCommands::DeleteInquiry { .. }
                | AdminCommands::DeleteRequest { .. }
                | AdminCommands::DeleteContact { .. }
        )
    }
}

#[derive(Args)]
struct AddPhoneArgs {
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    #[arg(long, default_value = "")]
    model_number: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    storage: String,
    #[arg(long)]
    ram: String,
    /// Excellent, Good, Fair or "Like New"
    #[arg(long)]
    condition: String,
    #[arg(long, default_value = "")]
    condition_rating: String,
    #[arg(long, default_value = "")]
    color: String,
    /// Battery health percentage
    #[arg(long, default_value = "")]
    battery_health: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    delivery_info: String,
    /// Comma-separated image URLs
    #[arg(long, default_value = "")]
    images: String,
    #[arg(long)]
    negotiable: bool,
}

impl From<AddPhoneArgs> for NewPhoneForm {
    fn from(args: AddPhoneArgs) -> Self {
        NewPhoneForm {
            brand: args.brand,
            model: args.model,
            model_number: args.model_number,
            price: args.price,
            storage: args.storage,
            ram: args.ram,
            condition: args.condition,
            condition_rating: args.condition_rating,
            color: args.color,
            battery_health: args.battery_health,
            description: args.description,
            delivery_info: args.delivery_info,
            images: args.images,
            is_negotiable: args.negotiable,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let (shop, data_file) = build_storefront(&cli).context("Failed to set up the storefront")?;
    let mutating = cli.command.is_mutating();

    let result = match cli.command {
        Commands::Browse {
            search,
            brand,
            condition,
            price,
            include_sold,
        } => {
            let criteria = FilterCriteria::from_raw(&search, &brand, &condition, &price);
            handle_browse(&shop, criteria, include_sold).await
        }
        Commands::Featured { limit } => handle_featured(&shop, limit).await,
        Commands::Show { id } => handle_show(&shop, id).await,
        Commands::Inquire {
            phone_id,
            contact,
            message,
        } => {
            let form = InquiryForm {
                name: contact.name,
                email: contact.email,
                phone: contact.phone,
                message,
            };
            shop.submit_inquiry(phone_id, &form)
                .await
                .map(|_| {
                    print_notice(&Notice::success(
                        "Inquiry Sent",
                        "We'll get back to you soon.",
                    ))
                })
                .map_err(anyhow::Error::from)
        }
        Commands::Request {
            contact,
            model,
            budget,
            message,
        } => {
            let form = RequestForm {
                name: contact.name,
                email: contact.email,
                phone: contact.phone,
                model_requested: model,
                budget,
                message,
            };
            shop.submit_request(&form)
                .await
                .map(|_| {
                    print_notice(&Notice::success(
                        "Request Submitted",
                        "We'll contact you when we find your phone.",
                    ))
                })
                .map_err(anyhow::Error::from)
        }
        Commands::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let form = ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            };
            shop.submit_contact(&form)
                .await
                .map(|_| print_notice(&Notice::success("Message Sent", "Thanks for reaching out.")))
                .map_err(anyhow::Error::from)
        }
        Commands::Admin(command) => handle_admin(&shop, command).await,
    };

    if let (Ok(()), true, Some(data)) = (&result, mutating, &data_file) {
        save_data_file(data)?;
    }

    // Show the advisory notice for storefront failures before exiting
    if let Err(e) = &result {
        if let Some(err) = e.downcast_ref::<StorefrontError>() {
            print_notice(&err.notice());
        }
    }
    result
}

/// In-memory tables loaded from `--data-file`, kept so writes can be saved
struct DataFile {
    path: PathBuf,
    store: InMemoryStore,
}

/// Assemble the storefront from either a data file or the hosted store
fn build_storefront(cli: &Cli) -> Result<(Storefront, Option<DataFile>)> {
    if let Some(path) = &cli.data_file {
        let memory = load_data_file(path)?;
        let store: Arc<dyn RecordStore> = Arc::new(memory.clone());
        let sessions = match cli.as_user {
            Some(user_id) => StaticSessionProvider::signed_in(Session::new(user_id)),
            None => StaticSessionProvider::anonymous(),
        };
        let shop = Storefront::new(
            store.clone(),
            Arc::new(sessions),
            Arc::new(StoreRoleChecker::new(store)),
        );
        let data = DataFile {
            path: path.clone(),
            store: memory,
        };
        return Ok((shop, Some(data)));
    }

    // Flags override the environment; the clients validate the result
    let mut config = StoreConfig::load_env().context("Invalid store settings")?;
    if let Some(url) = &cli.store_url {
        config.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }
    if let Some(token) = &cli.access_token {
        config = config.with_access_token(token.clone());
    }

    let sessions =
        RestSessionProvider::new(config.clone()).context("Failed to create auth client")?;
    let store: Arc<dyn RecordStore> = Arc::new(
        RestStore::with_token(config, sessions.token_handle())
            .context("Failed to create store client")?,
    );
    let shop = Storefront::new(
        store.clone(),
        Arc::new(sessions),
        Arc::new(StoreRoleChecker::new(store)),
    );
    Ok((shop, None))
}

fn load_data_file(path: &Path) -> Result<InMemoryStore> {
    let start = Instant::now();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&raw).context("Data file is not valid JSON")?;
    let store = InMemoryStore::from_json(&document).context("Data file has an unexpected shape")?;
    tracing::info!("Loaded {} in {:?}", path.display(), start.elapsed());
    Ok(store)
}

/// Write the tables back, replacing the file only once the new copy is complete
fn save_data_file(data: &DataFile) -> Result<()> {
    let document = data.store.to_json().context("Failed to snapshot the data file")?;
    let raw = serde_json::to_string_pretty(&document)?;

    let staging = data.path.with_extension("json.tmp");
    std::fs::write(&staging, raw)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    std::fs::rename(&staging, &data.path)
        .with_context(|| format!("Failed to replace data file {}", data.path.display()))?;
    tracing::info!("Saved {}", data.path.display());
    Ok(())
}

/// Handle the 'browse' command
async fn handle_browse(shop: &Storefront, criteria: FilterCriteria, include_sold: bool) -> Result<()> {
    let sold = if include_sold {
        SoldFilter::All
    } else {
        SoldFilter::AvailableOnly
    };

    let view = Mutex::new(CatalogView::new());
    view.lock().await.set_criteria(criteria);

    if let LoadOutcome::Discarded = shop.load_catalog(&view, sold).await? {
        tracing::warn!("Catalog load was superseded");
    }

    let mut view = view.lock().await;
    if let Visible::Phones(phones) = view.visible() {
        println!("{}", "Phones:".bold().blue());
        for phone in phones {
            print_phone_line(phone);
        }
    }
    println!("{}", view.summary().dimmed());
    Ok(())
}

/// Handle the 'featured' command
async fn handle_featured(shop: &Storefront, limit: usize) -> Result<()> {
    let phones = shop.featured_phones(limit).await?;
    println!("{}", "Featured Phones:".bold().blue());
    for phone in &phones {
        print_phone_line(phone);
    }
    Ok(())
}

/// Handle the 'show' command
async fn handle_show(shop: &Storefront, id: Uuid) -> Result<()> {
    let phone = shop.phone_detail(id).await?;

    println!("{}", phone.display_name().bold().blue());
    println!("{}Price: {}", "• ".green(), format_price(phone.price));
    if phone.is_negotiable {
        println!("{}Negotiable", "• ".green());
    }
    println!("{}Condition: {}", "• ".green(), phone.condition);
    print_optional("Model number", phone.model_number.as_deref());
    print_optional("Storage", phone.storage.as_deref());
    print_optional("RAM", phone.ram.as_deref());
    print_optional("Color", phone.color.as_deref());
    print_optional("Condition rating", phone.condition_rating.as_deref());
    if let Some(battery) = phone.battery_health {
        println!("{}Battery health: {}%", "• ".cyan(), battery);
    }
    print_optional("Delivery", phone.delivery_info.as_deref());
    if let Some(description) = &phone.description {
        println!("\n{}", description);
    }
    for image in &phone.images {
        println!("  {}", image.dimmed());
    }
    if phone.is_sold {
        println!("{}", "This phone has been sold.".red());
    }
    Ok(())
}

/// Handle the 'admin' subcommands
async fn handle_admin(shop: &Storefront, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Stats => print_dashboard(&shop.dashboard().await?),
        AdminCommands::Phones => {
            let phones = shop.admin_phones().await?;
            println!("{}", format!("Inventory ({} phones):", phones.len()).bold().blue());
            for phone in &phones {
                print_phone_line(phone);
            }
        }
        AdminCommands::Add(args) => {
            let phone = shop.add_phone(&args.into()).await?;
            print_notice(&Notice::success("Success!", "Phone added successfully"));
            print_phone_line(&phone);
        }
        AdminCommands::ToggleSold { id } => {
            let phone = shop.toggle_sold(id).await?;
            let status = if phone.is_sold { "sold" } else { "available" };
            print_notice(&Notice::success("Success", format!("Phone marked as {}", status)));
        }
        AdminCommands::DeletePhone { id } => {
            shop.delete_phone(id).await?;
            print_notice(&Notice::success("Success", "Phone deleted successfully"));
        }
        AdminCommands::Inquiries => {
            let inquiries = shop.inquiries().await?;
            println!("{}", format!("Inquiries ({}):", inquiries.len()).bold().blue());
            for inquiry in &inquiries {
                print_inquiry(inquiry);
            }
        }
        AdminCommands::Requests => {
            let requests = shop.requests().await?;
            println!("{}", format!("Phone requests ({}):", requests.len()).bold().blue());
            for request in &requests {
                print_request(request);
            }
        }
        AdminCommands::Contacts => {
            let contacts = shop.contacts().await?;
            println!("{}", format!("Contact messages ({}):", contacts.len()).bold().blue());
            for contact in &contacts {
                print_contact(contact);
            }
        }
        AdminCommands::DeleteInquiry { id } => {
            shop.delete_inquiry(id).await?;
            print_notice(&Notice::success("Success", "Inquiry deleted successfully"));
        }
        AdminCommands::DeleteRequest { id } => {
            shop.delete_request(id).await?;
            print_notice(&Notice::success("Success", "Request deleted successfully"));
        }
        AdminCommands::DeleteContact { id } => {
            shop.delete_contact(id).await?;
            print_notice(&Notice::success("Success", "Contact message deleted successfully"));
        }
        AdminCommands::SignOut => {
            shop.sign_out().await?;
            print_notice(&Notice::success(
                "Logged Out",
                "You've been successfully logged out.",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Output helpers
// ============================================================================

fn format_price(price: f64) -> String {
    format!("₹{:.0}", price)
}

fn print_phone_line(phone: &Phone) {
    let status = if phone.is_sold {
        " SOLD".red().to_string()
    } else {
        String::new()
    };
    println!(
        "{} {} [{}]{}  {}",
        phone.display_name().bold(),
        format_price(phone.price).green(),
        phone.condition,
        status,
        phone.id.to_string().dimmed()
    );
}

fn print_optional(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("{}{}: {}", "• ".cyan(), label, value);
    }
}

fn print_dashboard(stats: &DashboardStats) {
    println!("{}", "Dashboard:".bold().blue());
    println!("{}Total phones: {}", "• ".green(), stats.inventory.total);
    println!("{}Available: {}", "• ".green(), stats.inventory.available);
    println!("{}Sold: {}", "• ".green(), stats.inventory.sold);
    println!("{}Inquiries: {}", "• ".cyan(), stats.inquiries);
    println!("{}Phone requests: {}", "• ".cyan(), stats.specific_requests);
    println!("{}Contact messages: {}", "• ".cyan(), stats.contact_submissions);
}

fn print_inquiry(inquiry: &Inquiry) {
    let about = inquiry
        .listing
        .as_ref()
        .map(|p| format!("{} {}", p.brand, p.model))
        .unwrap_or_else(|| "Unknown phone".to_string());
    println!(
        "{} <{}> {} about {}  {}",
        inquiry.name.bold(),
        inquiry.email,
        inquiry.phone,
        about.green(),
        inquiry.id.to_string().dimmed()
    );
    if let Some(message) = &inquiry.message {
        println!("   {}", message);
    }
}

fn print_request(request: &SpecificRequest) {
    let budget = request
        .budget
        .map(format_price)
        .unwrap_or_else(|| "no budget".to_string());
    println!(
        "{} <{}> {} wants {} ({})  {}",
        request.name.bold(),
        request.email,
        request.phone,
        request.model_requested.green(),
        budget,
        request.id.to_string().dimmed()
    );
    if let Some(message) = &request.message {
        println!("   {}", message);
    }
}

fn print_contact(contact: &ContactSubmission) {
    println!(
        "{} <{}> {}  {}",
        contact.name.bold(),
        contact.email,
        contact.subject.as_deref().unwrap_or("(no subject)").green(),
        contact.id.to_string().dimmed()
    );
    println!("   {}", contact.message);
}

fn print_notice(notice: &Notice) {
    let title = match notice.severity {
        Severity::Success => format!("✓ {}", notice.title).green().bold(),
        Severity::Error => format!("✗ {}", notice.title).red().bold(),
    };
    println!("{} {}", title, notice.description);
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_store::Table;
    use serde_json::json;

    fn temp_data_file(document: serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!("phone-shop-{}.json", Uuid::new_v4()));
        std::fs::write(&path, document.to_string()).unwrap();
        path
    }

    fn mutates(args: &[&str]) -> bool {
        Cli::try_parse_from(args).unwrap().command.is_mutating()
    }

    #[test]
    fn test_only_writes_are_mutating() {

        assert!(!mutates(&["phone-shop", "browse", "--brand", "Apple"]));
        assert!(!mutates(&["phone-shop", "admin", "phones"]));
        assert!(!mutates(&["phone-shop", "admin", "sign-out"]));
        let id = Uuid::new_v4().to_string();
        assert!(mutates(&["phone-shop", "admin", "delete-inquiry", "--id", id.as_str()]));
        assert!(mutates(&[
            "phone-shop", "contact", "--name", "Meera", "--email", "meera@mail.in", "--message", "Hi",
        ]));
    }

    #[tokio::test]
    async fn test_data_file_keeps_admin_writes() {
        let admin = Uuid::new_v4();
        let path = temp_data_file(json!({
            "phones": [],
            "user_roles": [{"user_id": admin.to_string(), "role": "admin"}]
        }));
        let path_arg = path.to_string_lossy().to_string();
        let admin_arg = admin.to_string();

        let cli = Cli::try_parse_from([
            "phone-shop", "--data-file", path_arg.as_str(), "--as-user", admin_arg.as_str(),
            "admin", "add", "--brand", "Google", "--model", "Pixel 7", "--price", "30000",
            "--storage", "128GB", "--ram", "8GB", "--condition", "Good",
        ])
        .unwrap();
        let (shop, data) = build_storefront(&cli).unwrap();
        let Commands::Admin(AdminCommands::Add(args)) = cli.command else {
            panic!("expected admin add");
        };
        let added = shop.add_phone(&args.into()).await.unwrap();
        save_data_file(&data.unwrap()).unwrap();

        let reloaded = load_data_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(reloaded.count(Table::Phones).await.unwrap(), 1);
        assert_eq!(reloaded.count(Table::UserRoles).await.unwrap(), 1);
        let row = reloaded
            .get_by_id(Table::Phones, &added.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["model"], "Pixel 7");
    }
}
