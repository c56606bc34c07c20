use birthday_reminder::config::cli::{Cli, Command};
use birthday_reminder::config::{AppConfig, DeliveryChannel};
use birthday_reminder::core::calendar::{parse_month_day, upcoming};
use birthday_reminder::core::NotificationSink;
use birthday_reminder::domain::model::BirthdayRecord;
use birthday_reminder::domain::ports::RecordStore;
use birthday_reminder::utils::error::{ErrorSeverity, ReminderError};
use birthday_reminder::utils::{logger, validation::Validate};
use birthday_reminder::{
    DailyScheduler, JsonFileStore, LogSink, ReminderDispatcher, ReminderService, SmtpSink,
    WebhookSink,
};
use chrono::{Local, NaiveDate};
use clap::Parser;

type Dispatcher = ReminderDispatcher<Box<dyn NotificationSink>>;

#[tokio::main]
async fn main() {
    // .env 不存在時忽略
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if matches!(cli.command, Command::Serve) && config.json_logs() {
        logger::init_service_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), ReminderError> {
    let store = JsonFileStore::new(config.store_path());

    match cli.command {
        Command::Check { date, dry_run } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let dispatcher = build_dispatcher(&config, dry_run)?;
            let service = ReminderService::new(store, dispatcher);

            let report = service.check(today).await?;
            println!(
                "✅ {}: {} checked, {} reminders sent, {} failed",
                report.run_date,
                report.records_scanned,
                report.sent_count(),
                report.failed_count()
            );
            for failure in report.failures() {
                println!("  ❌ {} <{}>: {:?}", failure.name, failure.email, failure.outcome);
            }
            for rejected in &report.rejected {
                println!("  ⚠️ #{} {}: {}", rejected.record_id, rejected.name, rejected.reason);
            }
        }
        Command::Serve => {
            let schedule = config.schedule()?;
            let dispatcher = build_dispatcher(&config, false)?;
            let service = ReminderService::new(store, dispatcher);

            let handle = DailyScheduler::new(schedule, service).start();
            println!("⏰ Checking birthdays {}. Press Ctrl+C to stop.", schedule);

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown requested");
            handle.stop().await;
        }
        Command::List { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let records = store.list_all_records().await?;
            print_upcoming(&records, today);
        }
        Command::Add {
            name,
            email,
            date,
            notify_days_before,
            notes,
        } => {
            let (month, day) = parse_month_day(&date)?;
            let mut record = BirthdayRecord::new(name, email, month, day)
                .with_notify_days_before(notify_days_before);
            record.notes = notes;

            let record = store.add_record(record)?;
            println!(
                "✅ Added #{} {} ({:02}-{:02})",
                record.id, record.name, record.birth_month, record.birth_day
            );
        }
        Command::Remove { id } => {
            if store.remove_record(id)? {
                println!("✅ Removed #{}", id);
            } else {
                println!("No record with id {}", id);
            }
        }
    }

    Ok(())
}

fn build_dispatcher(config: &AppConfig, dry_run: bool) -> Result<Dispatcher, ReminderError> {
    // dry run 不需要郵件設定
    let channel = if dry_run {
        DeliveryChannel::Log
    } else {
        config.validate()?;
        config.channel()
    };

    let sink: Box<dyn NotificationSink> = match channel {
        DeliveryChannel::Smtp => Box::new(SmtpSink::from_config(&config.mail)?),
        DeliveryChannel::Webhook => Box::new(WebhookSink::new(
            config.delivery.webhook_url.clone().unwrap_or_default(),
            config.delivery.webhook_token.clone(),
            config.mail.timeout(),
        )?),
        DeliveryChannel::Log => Box::new(LogSink),
    };

    tracing::info!("📮 Delivering reminders via {:?}", channel);
    Ok(ReminderDispatcher::new(sink).with_send_timeout(config.mail.timeout()))
}

fn print_upcoming(records: &[BirthdayRecord], today: NaiveDate) {
    let list = upcoming(records, today);
    if list.is_empty() {
        println!("No birthdays registered yet.");
        return;
    }

    println!("📋 Upcoming birthdays (as of {}):", today);
    for item in list {
        let marker = if item.is_today {
            "🎉"
        } else if item.is_due {
            "🔔"
        } else {
            "  "
        };
        println!(
            "{} #{:<3} {:<20} {:<28} {} (in {} days)",
            marker,
            item.record.id,
            item.record.name,
            item.record.email,
            item.occurrence.date,
            item.occurrence.days_until
        );
    }
}
