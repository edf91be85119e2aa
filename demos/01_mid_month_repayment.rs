/// mid-month repayment - inject an extra payment between two rows
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

    // row 2 is february; the extra payment lands on 10 march
    let event = Event::MidMonthRepayment {
        date: date(2024, 3, 10)?,
        amount: Money::from_major(1_000),
        service_fee: Money::ZERO,
        rate_override: None,
        anchor_index: 2,
    };

    let engine = ScheduleEngine::default();
    let presenter = SchedulePresenter::default();

    let schedule = engine.run(&params, &plan, Some(&event), date(2024, 6, 30)?)?;
    for view in presenter.entry_views(&schedule.entries) {
        println!(
            "{:>12}  open {:>10}  int {:>7}  rep {:>8}  close {:>10}",
            view.end_date, view.opening_balance, view.interest, view.repayment, view.closing_balance
        );
    }
    println!("{}", schedule.projection);

    // a date on the anchor row itself is rejected
    let late = Event::MidMonthRepayment {
        date: date(2024, 2, 29)?,
        amount: Money::from_major(1_000),
        service_fee: Money::ZERO,
        rate_override: None,
        anchor_index: 2,
    };
    if let Err(err) = engine.run(&params, &plan, Some(&late), date(2024, 6, 30)?) {
        println!("rejected: {err}");
    }

    Ok(())
}
