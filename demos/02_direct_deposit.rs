/// direct deposit - split a month around a lump sum, then export as csv
use loan_schedule_rs::chrono::NaiveDate;
use loan_schedule_rs::{Event, LoanParameters, Money, Rate, RepaymentPlan, SchedulePresenter, ScheduleEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("bad date");

    let params = LoanParameters::new(
        Money::from_major(10_000),
        Rate::from_percentage(12),
        Money::from_major(20),
        date(2024, 1, 15)?,
    );
    let plan = RepaymentPlan::level(Money::from_major(500), 12);

    let deposit = Event::DirectDeposit {
        date: date(2024, 3, 10)?,
        amount: Money::from_major(2_000),
    };

    let engine = ScheduleEngine::default();
    let schedule = engine.run(&params, &plan, Some(&deposit), date(2024, 8, 1)?)?;

    let presenter = SchedulePresenter::default();
    presenter.export_csv(&schedule.entries, std::io::stdout().lock())?;
    println!("{}", schedule.projection);

    Ok(())
}
