/// quick start - build a year of monthly entries and project settlement
use loan_schedule_rs::chrono::NaiveDate;
use loan_schedule_rs::{LoanParameters, Money, Rate, RepaymentPlan, SchedulePresenter, ScheduleEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad start date")?;
    let as_of = NaiveDate::from_ymd_opt(2024, 12, 5).ok_or("bad as-of date")?;

    // $10,000 at 12% p.a. with a $20 monthly fee, repaid at $500 a month
    let params = LoanParameters::new(
        Money::from_major(10_000),
        Rate::from_percentage(12),
        Money::from_major(20),
        start,
    );
    let plan = RepaymentPlan::level(Money::from_major(500), 12);

    let engine = ScheduleEngine::default();
    let schedule = engine.run(&params, &plan, None, as_of)?;

    let presenter = SchedulePresenter::default();
    println!("{}", serde_json::to_string_pretty(&presenter.entry_views(&schedule.entries))?);
    println!("{}", schedule.projection);

    Ok(())
}
