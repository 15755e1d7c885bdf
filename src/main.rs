//! Vigil CLI
//!
//! Command-line front end for the monitoring service:
//! - Sign in and manage the session
//! - Show dashboard, Twitter, wallet, holdings and notification pages
//! - Manage followed accounts, wallets, subscription and settings

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use vigil::config::generate_default_config;
use vigil::models::{OAuthProvider, PasswordChange, ProfileUpdate, RegisterRequest, User};
use vigil::pages::ON_DEMAND_INTERVAL;
use vigil::view::{render, NotificationFilter, ReadFilter, TweetFilter, TweetOrder};
use vigil::{
    ApiClient, AppShell, Config, DashboardPage, FileSessionStore, Fetched, HoldingsPage,
    NotificationCenterPage, PollingController, ResourceFetcher, Route, SettingsPage,
    SubscriptionPage, TwitterMonitorPage, TwitterProfilePage, WalletMonitorPage,
};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crypto signal monitoring from the terminal")]
#[command(long_about = "Vigil follows Twitter accounts, wallets and institutional holdings.\nPages that cannot be loaded show sample data, marked as such.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Config file (default: ~/.config/vigil/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,
        /// Email verification code
        #[arg(long)]
        code: Option<String>,
    },

    /// Send an email verification code
    SendCode { email: String },

    /// Print the authorization URL for a provider (google, apple)
    OauthUrl { provider: OAuthProvider },

    /// Complete a provider sign-in with the code from the callback
    OauthLogin {
        provider: OAuthProvider,
        code: String,
        #[arg(long)]
        state: Option<String>,
    },

    /// Overview of tweets, wallets, holdings and notifications
    Dashboard {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Followed Twitter accounts and their tweets
    Twitter {
        #[command(subcommand)]
        action: TwitterAction,
    },

    /// Watched wallets
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },

    /// Institutional BTC/ETH holdings
    Holdings {
        #[arg(short, long)]
        watch: bool,
    },

    /// Notification center
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Subscription plan and billing
    Subscription {
        #[command(subcommand)]
        action: SubscriptionAction,
    },

    /// Account settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Print a default config file
    Config {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TwitterAction {
    /// Show accounts and tweets
    List {
        /// Only verified authors
        #[arg(long)]
        verified: bool,
        /// Only high-engagement tweets
        #[arg(long)]
        popular: bool,
        #[arg(long)]
        search: Option<String>,
        /// latest or engagement
        #[arg(long, default_value = "latest")]
        sort: TweetOrder,
        #[arg(short, long)]
        watch: bool,
    },
    /// Follow an account
    Add { username: String },
    /// Stop following an account
    Remove { id: String },
    Enable { id: String },
    Disable { id: String },
    /// Linked wallets, portfolio and connections of any Twitter user
    Profile {
        username: String,
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Subcommand)]
enum WalletAction {
    /// Show wallets and recent transactions
    List {
        #[arg(short, long)]
        watch: bool,
    },
    /// Watch a wallet
    Add {
        address: String,
        #[arg(long)]
        label: Option<String>,
    },
    Remove { id: String },
    Enable { id: String },
    Disable { id: String },
    /// Recent transactions only
    Transactions,
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Show notifications
    List {
        /// twitter, wallet, price or system
        #[arg(long = "type")]
        kind: Option<vigil::models::NotificationKind>,
        /// all, unread or read
        #[arg(long, default_value = "all")]
        status: ReadFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(short, long)]
        watch: bool,
    },
    /// Counters only
    Stats,
    /// Mark notifications as read
    Read {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark every unread notification as read
    ReadAll,
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SubscriptionAction {
    /// Current plan and trial state
    Status,
    /// Available plans
    Plans,
    /// Payment history
    History,
    /// Start an upgrade and print the payment URL
    Upgrade { plan: String },
    Cancel,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Update profile fields
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Change password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Update notification preferences; omitted flags keep their current value
    Notifications {
        #[arg(long)]
        email: Option<bool>,
        #[arg(long)]
        sms: Option<bool>,
        #[arg(long)]
        push: Option<bool>,
        #[arg(long)]
        twitter: Option<bool>,
        #[arg(long)]
        wallet: Option<bool>,
        #[arg(long)]
        price: Option<bool>,
        #[arg(long)]
        system: Option<bool>,
        /// e.g. realtime, hourly, daily
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Update security preferences
    Security {
        #[arg(long)]
        two_factor: Option<bool>,
        #[arg(long)]
        login_alerts: Option<bool>,
        /// e.g. 1h, 24h, 7d
        #[arg(long)]
        session_timeout: Option<String>,
    },
    /// Update display preferences
    Interface {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        date_format: Option<String>,
        #[arg(long)]
        auto_refresh: Option<bool>,
        /// Seconds
        #[arg(long)]
        refresh_interval: Option<u64>,
    },
    /// Permanently delete the account and sign out
    DeleteAccount {
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    vigil::logging::init(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let text = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, text)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            None => print!("{}", text),
        }
        return Ok(());
    }

    let store = Arc::new(FileSessionStore::open(config.session.path())?);
    let client = Arc::new(ApiClient::new(&config.api, store)?);
    let mut shell = AppShell::new(Arc::clone(&client));
    let format = cli.format;
    let polling = &config.polling;

    match cli.command {
        Commands::Config { .. } => {}

        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line("Password: ")?,
            };
            let user = shell.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.username, user.email);
        }

        Commands::Logout => {
            shell.logout().await?;
            println!("Signed out");
        }

        Commands::Whoami => {
            let user = require_session(&mut shell, Route::Settings)
                .await?
                .context("Signed in, but the API could not be reached to load the profile")?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
                OutputFormat::Table => print!("{}", render::user(user, Utc::now())),
            }
        }

        Commands::Register {
            username,
            email,
            password,
            code,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password,
                verification_code: code,
            };
            shell.register(&request).await?;
            println!("Account created. Sign in with `vigil login {}`", request.email);
        }

        Commands::SendCode { email } => {
            shell.send_verification_code(&email).await?;
            println!("Verification code sent to {}", email);
        }

        Commands::OauthUrl { provider } => {
            println!("{}", shell.oauth_authorize_url(provider).await?);
        }

        Commands::OauthLogin {
            provider,
            code,
            state,
        } => {
            let user = shell
                .oauth_callback(provider, &code, state.as_deref())
                .await?;
            println!("Signed in as {} via {}", user.username, provider.as_str());
        }

        Commands::Dashboard { watch } => {
            require_session(&mut shell, Route::Dashboard).await?;
            let page = DashboardPage::new(client, polling.dashboard());
            show(page.poller(), watch, format, |f| {
                render::dashboard(&f.data, Utc::now())
            })
            .await?;
        }

        Commands::Twitter { action } => {
            require_session(&mut shell, Route::TwitterMonitor).await?;
            let page = TwitterMonitorPage::new(Arc::clone(&client), polling.twitter());
            match action {
                TwitterAction::List {
                    verified,
                    popular,
                    search,
                    sort,
                    watch,
                } => {
                    let filter = TweetFilter {
                        verified_only: verified,
                        high_engagement: popular,
                        search,
                        order: sort,
                    };
                    show(page.poller(), watch, format, |f| {
                        let shown = filter.apply(&f.data.tweets);
                        render::twitter(&f.data, &shown, Utc::now())
                    })
                    .await?;
                }
                TwitterAction::Add { username } => match page.add_account(&username).await? {
                    Some(account) => println!("Following @{} (id {})", account.username, account.id),
                    None => println!("Following @{}", username.trim_start_matches('@')),
                },
                TwitterAction::Remove { id } => {
                    page.remove_account(&id).await?;
                    println!("Removed account {}", id);
                }
                TwitterAction::Enable { id } => {
                    page.set_account_active(&id, true).await?;
                    println!("Enabled account {}", id);
                }
                TwitterAction::Disable { id } => {
                    page.set_account_active(&id, false).await?;
                    println!("Disabled account {}", id);
                }
                TwitterAction::Profile { username, watch } => {
                    let profile = TwitterProfilePage::new(client, &username, polling.twitter())?;
                    show(profile.poller(), watch, format, |f| {
                        let mut out = render::source_banner(f);
                        out.push('\n');
                        out.push_str(&render::twitter_profile(&f.data, Utc::now()));
                        out
                    })
                    .await?;
                }
            }
        }

        Commands::Wallet { action } => {
            require_session(&mut shell, Route::WalletMonitor).await?;
            let page = WalletMonitorPage::new(client, polling.wallet());
            match action {
                WalletAction::List { watch } => {
                    show(page.poller(), watch, format, |f| {
                        render::wallet_page(&f.data, Utc::now())
                    })
                    .await?;
                }
                WalletAction::Transactions => {
                    show(page.poller(), false, format, |f| {
                        let mut out = render::source_banner(f);
                        render::transactions(&mut out, &f.data.transactions, Utc::now());
                        out
                    })
                    .await?;
                }
                WalletAction::Add { address, label } => {
                    page.add_wallet(&address, label.as_deref()).await?;
                    println!("Watching {}", address.trim());
                }
                WalletAction::Remove { id } => {
                    page.remove_wallet(&id).await?;
                    println!("Removed wallet {}", id);
                }
                WalletAction::Enable { id } => {
                    page.set_wallet_active(&id, true).await?;
                    println!("Enabled wallet {}", id);
                }
                WalletAction::Disable { id } => {
                    page.set_wallet_active(&id, false).await?;
                    println!("Disabled wallet {}", id);
                }
            }
        }

        Commands::Holdings { watch } => {
            require_session(&mut shell, Route::Holdings).await?;
            let page = HoldingsPage::new(client, polling.holdings());
            show(page.poller(), watch, format, |f| {
                let mut out = render::source_banner(f);
                render::holdings(&mut out, &f.data);
                out
            })
            .await?;
        }

        Commands::Notifications { action } => {
            require_session(&mut shell, Route::Notifications).await?;
            let page = NotificationCenterPage::new(client, polling.notifications());
            match action {
                NotificationAction::List {
                    kind,
                    status,
                    search,
                    watch,
                } => {
                    let filter = NotificationFilter {
                        kind,
                        read: status,
                        search,
                    };
                    show(page.poller(), watch, format, |f| {
                        let shown = filter.apply(&f.data.notifications);
                        render::notification_page(&f.data, &shown, Utc::now())
                    })
                    .await?;
                }
                NotificationAction::Stats => {
                    show(page.poller(), false, format, |f| {
                        let mut out = render::source_banner(f);
                        render::notification_stats(&mut out, &f.data.stats);
                        out
                    })
                    .await?;
                }
                NotificationAction::Read { ids } => {
                    page.mark_read(&ids).await?;
                    println!("Marked {} as read", ids.len());
                }
                NotificationAction::ReadAll => {
                    let count = page.mark_all_read().await?;
                    println!("Marked {} as read", count);
                }
                NotificationAction::Delete { ids } => {
                    page.delete(&ids).await?;
                    println!("Deleted {}", ids.len());
                }
            }
        }

        Commands::Subscription { action } => {
            require_session(&mut shell, Route::Upgrade).await?;
            let page = SubscriptionPage::new(client, ON_DEMAND_INTERVAL);
            match action {
                SubscriptionAction::Status => {
                    show(page.poller(), false, format, |f| render::subscription(&f.data)).await?;
                    if let (OutputFormat::Table, Some(days)) = (format, shell.trial_days_left()) {
                        println!("Trial days left: {}", days);
                    }
                }
                SubscriptionAction::Plans => {
                    show(page.poller(), false, format, |f| render::plans(&f.data)).await?;
                }
                SubscriptionAction::History => {
                    show(page.poller(), false, format, |f| render::payments(&f.data)).await?;
                }
                SubscriptionAction::Upgrade { plan } => {
                    let url = page.upgrade(&plan).await?;
                    println!("Complete payment at: {}", url);
                }
                SubscriptionAction::Cancel => {
                    page.cancel().await?;
                    println!("Subscription cancelled");
                }
            }
        }

        Commands::Settings { action } => {
            let user = require_session(&mut shell, Route::Settings).await?.cloned();
            let page = SettingsPage::new(client, ON_DEMAND_INTERVAL);
            match action {
                SettingsAction::Show => {
                    show(page.poller(), false, format, |f| {
                        let mut out = render::source_banner(f);
                        out.push_str(&render::settings(&f.data));
                        out
                    })
                    .await?;
                }
                SettingsAction::Profile {
                    username,
                    email,
                    avatar,
                } => {
                    let profile = ProfileUpdate {
                        username: username
                            .or_else(|| user.as_ref().map(|u| u.username.clone()))
                            .unwrap_or_default(),
                        email: email
                            .or_else(|| user.as_ref().map(|u| u.email.clone()))
                            .unwrap_or_default(),
                        avatar: avatar
                            .or_else(|| user.as_ref().and_then(|u| u.avatar.clone()))
                            .unwrap_or_default(),
                    };
                    page.save_profile(&profile).await?;
                    println!("Profile saved");
                }
                SettingsAction::Password {
                    current,
                    new,
                    confirm,
                } => {
                    let change = PasswordChange {
                        current_password: current,
                        new_password: new,
                        confirm_password: confirm,
                    };
                    page.change_password(&change).await?;
                    println!("Password changed");
                }
                SettingsAction::Notifications {
                    email,
                    sms,
                    push,
                    twitter,
                    wallet,
                    price,
                    system,
                    frequency,
                } => {
                    let mut settings = live_settings(&page).await?.notifications;
                    set(&mut settings.email_notifications, email);
                    set(&mut settings.sms_notifications, sms);
                    set(&mut settings.push_notifications, push);
                    set(&mut settings.twitter_alerts, twitter);
                    set(&mut settings.wallet_alerts, wallet);
                    set(&mut settings.price_alerts, price);
                    set(&mut settings.system_alerts, system);
                    set(&mut settings.alert_frequency, frequency);
                    page.save_notification_settings(&settings).await?;
                    println!("Notification settings saved");
                }
                SettingsAction::Security {
                    two_factor,
                    login_alerts,
                    session_timeout,
                } => {
                    let mut settings = live_settings(&page).await?.security;
                    set(&mut settings.two_factor_enabled, two_factor);
                    set(&mut settings.login_alerts, login_alerts);
                    set(&mut settings.session_timeout, session_timeout);
                    page.save_security_settings(&settings).await?;
                    println!("Security settings saved");
                }
                SettingsAction::Interface {
                    theme,
                    language,
                    timezone,
                    currency,
                    date_format,
                    auto_refresh,
                    refresh_interval,
                } => {
                    let mut settings = live_settings(&page).await?.interface;
                    set(&mut settings.theme, theme);
                    set(&mut settings.language, language);
                    set(&mut settings.timezone, timezone);
                    set(&mut settings.currency, currency);
                    set(&mut settings.date_format, date_format);
                    set(&mut settings.auto_refresh, auto_refresh);
                    set(&mut settings.refresh_interval, refresh_interval);
                    page.save_interface_settings(&settings).await?;
                    println!("Interface settings saved");
                }
                SettingsAction::DeleteAccount { yes } => {
                    if !yes {
                        bail!("Deleting the account cannot be undone. Re-run with --yes.");
                    }
                    page.delete_account().await?;
                    shell.navigate(Route::Settings);
                    println!("Account deleted. Signed out.");
                }
            }
        }
    }

    Ok(())
}

/// Restore the session and pass the route guard, or fail with a login hint.
/// The user is `None` when the session was kept but the API is unreachable.
async fn require_session(shell: &mut AppShell, route: Route) -> anyhow::Result<Option<&User>> {
    shell.bootstrap().await;
    if shell.navigate(route) != route {
        bail!("Not logged in. Run `vigil login <email>` first.");
    }
    Ok(shell.user())
}

/// Settings as the server has them. Partial updates start from these, so
/// sample defaults are never written back.
async fn live_settings(page: &SettingsPage) -> anyhow::Result<vigil::models::UserSettings> {
    let loaded = page.load().await;
    if !loaded.is_live() {
        bail!(
            "Current settings could not be loaded ({}); nothing was saved",
            loaded.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(loaded.data)
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[derive(Serialize)]
struct JsonOutput<'a, T> {
    source: vigil::DataSource,
    fetched_at: chrono::DateTime<Utc>,
    error: Option<&'a str>,
    data: &'a T,
}

fn print_fetched<T: Serialize>(
    fetched: &Fetched<T>,
    format: OutputFormat,
    view: &impl Fn(&Fetched<T>) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let out = JsonOutput {
                source: fetched.source,
                fetched_at: fetched.fetched_at,
                error: fetched.error.as_deref(),
                data: &fetched.data,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => print!("{}", view(fetched)),
    }
    Ok(())
}

/// Print one load, or keep printing each published result until Ctrl-C
async fn show<F>(
    poller: &PollingController<F>,
    watch: bool,
    format: OutputFormat,
    view: impl Fn(&Fetched<F::Output>) -> String,
) -> anyhow::Result<()>
where
    F: ResourceFetcher + 'static,
    F::Output: Serialize,
{
    if !watch {
        let fetched = poller.refresh().await;
        return print_fetched(&fetched, format, &view);
    }

    let mut rx = poller.subscribe();
    poller.mount();
    tracing::info!(interval_secs = poller.interval().as_secs(), "Watching, Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = rx.borrow_and_update().clone();
                if let Some(fetched) = latest {
                    if format == OutputFormat::Table {
                        println!("--- {} ---", fetched.fetched_at.format("%H:%M:%S"));
                    }
                    print_fetched(&fetched, format, &view)?;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    poller.unmount();
    Ok(())
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        bail!("No password given");
    }
    Ok(line)
}
