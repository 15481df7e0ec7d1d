// src/report/catalog.rs

//! The built-in report catalogue, in run order.

use crate::query::{AggregateQuery, Expr, Filter, Order, WindowBound};

use super::Report;

const STATE: &str = "STATE_NAME";
const DISTRICT: &str = "DIST_NAME";
const YEAR: &str = "YEAR";

const RICE_AREA: &str = "RICE_AREA_(1000_HA)";
const RICE_PRODUCTION: &str = "RICE_PRODUCTION_(1000_TONS)";
const RICE_YIELD: &str = "RICE_YIELD_(KG_PER_HA)";
const WHEAT_AREA: &str = "WHEAT_AREA_(1000_HA)";
const WHEAT_PRODUCTION: &str = "WHEAT_PRODUCTION_(1000_TONS)";
const WHEAT_YIELD: &str = "WHEAT_YIELD_(KG_PER_HA)";
const MAIZE_AREA: &str = "MAIZE_AREA_(1000_HA)";
const MAIZE_PRODUCTION: &str = "MAIZE_PRODUCTION_(1000_TONS)";
const MAIZE_YIELD: &str = "MAIZE_YIELD_(KG_PER_HA)";
const OILSEEDS_AREA: &str = "OILSEEDS_AREA_(1000_HA)";
const OILSEEDS_PRODUCTION: &str = "OILSEEDS_PRODUCTION_(1000_TONS)";
const GROUNDNUT_PRODUCTION: &str = "GROUNDNUT_PRODUCTION_(1000_TONS)";

/// Years before the latest one that the trailing-window reports cover.
const TRAILING_YEARS: i64 = 5;

fn col(name: &str) -> Expr {
    Expr::col(name)
}

/// All built-in reports.
pub fn catalog() -> Vec<Report> {
    vec![
        Report::aggregate(
            "year-wise_total_rice_production_by_state.csv",
            year_wise_rice_production(),
        ),
        Report::aggregate(
            "top_5_districts_with_highest_wheat_yield_in_last_5_years.csv",
            wheat_yield_growth(),
        ),
        Report::aggregate(
            "top_5_states_with_highest_oilseed_production_growth_in_last_5_years.csv",
            oilseed_production_growth(),
        ),
        Report::aggregate(
            "area_vs_production_summary_for_major_crops_by_district.csv",
            area_vs_production_by_district(),
        ),
        // named for cotton, but ranked and reported on rice + wheat production
        Report::aggregate(
            "cotton_production_trend_for_top_5_cotton-producing_states.csv",
            top_states_rice_wheat_trend(),
        ),
        Report::aggregate(
            "top_10_districts_by_groundnut_production_in_2020.csv",
            groundnut_production_in(2020),
        ),
        Report::aggregate("year-wise_average_maize_yield.csv", average_maize_yield()),
        Report::aggregate(
            "state-wise_total_area_under_oilseeds.csv",
            oilseed_area_by_state(),
        ),
        Report::aggregate(
            "top_10_districts_with_highest_average_rice_yield.csv",
            average_rice_yield_by_district(),
        ),
        Report::aggregate(
            "rice_vs_wheat_production_comparison_for_top_5_producing_states.csv",
            top_states_rice_wheat_trend(),
        ),
    ]
}

fn year_wise_rice_production() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(YEAR), "Year")
        .select(col(STATE), "State_Name")
        .select(col(RICE_PRODUCTION).sum(), "Total_Rice_Production")
        .group_by([YEAR, STATE])
        .order_by(Expr::alias("Year"), Order::Asc)
        .order_by(Expr::alias("Total_Rice_Production"), Order::Desc)
}

/// Districts ranked by the spread between their best and worst wheat yield in the window.
fn wheat_yield_growth() -> AggregateQuery {
    let increase = col(WHEAT_YIELD).max() - col(WHEAT_YIELD).min();
    AggregateQuery::new()
        .select(col(DISTRICT), "District")
        .select(increase.clone().round(2), "Yield_Growth")
        .filter(Filter::TrailingWindow {
            column: YEAR.into(),
            years: TRAILING_YEARS,
            bound: WindowBound::AtLeast,
        })
        .group_by([DISTRICT])
        .order_by(increase, Order::Desc)
        .limit(5)
}

/// States ranked by percent growth from their lowest to highest oilseed production in the
/// window. A zero minimum yields a null growth rate.
fn oilseed_production_growth() -> AggregateQuery {
    let growth = (col(OILSEEDS_PRODUCTION).max() - col(OILSEEDS_PRODUCTION).min())
        / col(OILSEEDS_PRODUCTION).min().null_if(Expr::int(0))
        * Expr::int(100);
    AggregateQuery::new()
        .select(col(STATE), "State")
        .select(growth.clone().round(2), "Percent_Growth")
        .filter(Filter::TrailingWindow {
            column: YEAR.into(),
            years: TRAILING_YEARS,
            bound: WindowBound::Between,
        })
        .group_by([STATE])
        .order_by(growth, Order::Desc)
        .limit(5)
}

fn area_vs_production_by_district() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(DISTRICT), "District")
        .select(col(RICE_AREA).sum(), "Rice_Area")
        .select(col(RICE_PRODUCTION).sum(), "Rice_Prod")
        .select(col(WHEAT_AREA).sum(), "Wheat_Area")
        .select(col(WHEAT_PRODUCTION).sum(), "Wheat_Prod")
        .select(col(MAIZE_AREA).sum(), "Maize_Area")
        .select(col(MAIZE_PRODUCTION).sum(), "Maize_Prod")
        .group_by([DISTRICT])
}

/// Yearly rice and wheat production of the five states with the largest combined total.
fn top_states_rice_wheat_trend() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(YEAR), "Year")
        .select(col(STATE), "State")
        .select(col(RICE_PRODUCTION).sum(), "Rice_Prod")
        .select(col(WHEAT_PRODUCTION).sum(), "Wheat_Prod")
        .filter(Filter::InTopN {
            column: STATE.into(),
            rank: (col(RICE_PRODUCTION) + col(WHEAT_PRODUCTION)).sum(),
            limit: 5,
        })
        .group_by([YEAR, STATE])
        .order_by(Expr::alias("Year"), Order::Asc)
        .order_by(Expr::alias("State"), Order::Asc)
}

fn groundnut_production_in(year: i64) -> AggregateQuery {
    AggregateQuery::new()
        .select(col(DISTRICT), "District")
        .select(col(STATE), "State")
        .select(col(GROUNDNUT_PRODUCTION).sum(), "Total_Groundnut")
        .filter(Filter::Equals {
            column: YEAR.into(),
            value: year,
        })
        .group_by([DISTRICT, STATE])
        .order_by(Expr::alias("Total_Groundnut"), Order::Desc)
        .limit(10)
}

fn average_maize_yield() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(YEAR), "Year")
        .select(col(MAIZE_YIELD).avg().round(2), "Avg_Maize_Yield")
        .group_by([YEAR])
        .order_by(col(YEAR), Order::Asc)
}

fn oilseed_area_by_state() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(STATE), "State")
        .select(col(OILSEEDS_AREA).sum().round(2), "Total_Area")
        .group_by([STATE])
        .order_by(Expr::alias("Total_Area"), Order::Desc)
}

/// Ordered by the rounded average, so districts equal to two decimals tie.
fn average_rice_yield_by_district() -> AggregateQuery {
    AggregateQuery::new()
        .select(col(DISTRICT), "District")
        .select(col(STATE), "State")
        .select(col(RICE_YIELD).avg().round(2), "Avg_Rice_Yield")
        .group_by([DISTRICT, STATE])
        .order_by(Expr::alias("Avg_Rice_Yield"), Order::Desc)
        .limit(10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testutil::{
        crop_dataset, init_test_logging, load_rows, load_text, read_report, TABLE,
    };
    use crate::report::{run_reports, ReportOutcome};
    use anyhow::Result;
    use std::collections::HashSet;
    use std::path::Path;
    use tempfile::tempdir;

    fn run_named(
        conn: &duckdb::Connection,
        name: &str,
        dir: &Path,
    ) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let report = catalog()
            .into_iter()
            .find(|r| r.name == name)
            .expect("report in catalogue");
        let outcomes = run_reports(conn, TABLE, &[report], dir);
        match &outcomes[0] {
            ReportOutcome::Exported { path, .. } => read_report(path),
            ReportOutcome::Failed { error, .. } => panic!("{} failed: {}", name, error),
        }
    }

    #[test]
    fn catalogue_names_are_unique() {
        let reports = catalog();
        assert_eq!(reports.len(), 10);
        let names: HashSet<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), reports.len());
        assert!(reports.iter().all(|r| r.name.ends_with(".csv")));
    }

    #[test]
    fn every_report_runs_against_full_dataset() -> Result<()> {
        init_test_logging();
        let conn = load_text(&crop_dataset(7, 2012..=2020))?;
        let dir = tempdir()?;

        let outcomes = run_reports(&conn, TABLE, &catalog(), dir.path());
        let mut rows = Vec::new();
        for outcome in &outcomes {
            match outcome {
                ReportOutcome::Exported { name, rows: n, .. } => rows.push((name.as_str(), *n)),
                ReportOutcome::Failed { name, error } => panic!("{} failed: {}", name, error),
            }
        }

        // 7 states x 2 districts x 9 years
        let expected: [(&str, u64); 10] = [
            ("year-wise_total_rice_production_by_state.csv", 63),
            ("top_5_districts_with_highest_wheat_yield_in_last_5_years.csv", 5),
            ("top_5_states_with_highest_oilseed_production_growth_in_last_5_years.csv", 5),
            ("area_vs_production_summary_for_major_crops_by_district.csv", 14),
            ("cotton_production_trend_for_top_5_cotton-producing_states.csv", 45),
            ("top_10_districts_by_groundnut_production_in_2020.csv", 10),
            ("year-wise_average_maize_yield.csv", 9),
            ("state-wise_total_area_under_oilseeds.csv", 7),
            ("top_10_districts_with_highest_average_rice_yield.csv", 10),
            ("rice_vs_wheat_production_comparison_for_top_5_producing_states.csv", 45),
        ];
        assert_eq!(rows, expected);
        Ok(())
    }

    #[test]
    fn top_states_trend_keeps_only_the_largest_producers() -> Result<()> {
        let conn = load_text(&crop_dataset(7, 2019..=2020))?;
        let dir = tempdir()?;

        let (headers, rows) = run_named(
            &conn,
            "rice_vs_wheat_production_comparison_for_top_5_producing_states.csv",
            dir.path(),
        )?;
        assert_eq!(headers, vec!["Year", "State", "Rice_Prod", "Wheat_Prod"]);

        let states: HashSet<&str> = rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(states, ["S3", "S4", "S5", "S6", "S7"].into_iter().collect());

        let keys: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r[0].clone(), r[1].clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        Ok(())
    }

    #[test]
    fn wheat_window_follows_latest_year() -> Result<()> {
        let header = "DIST_NAME,YEAR,WHEAT_YIELD_(KG_PER_HA)";
        let mut rows = vec![
            // large spread, but before the window
            "Old,2010,100.0",
            "Old,2014,900.0",
            "Old,2015,500.0",
            "Old,2020,500.0",
            // inside the window
            "New,2015,100.0",
            "New,2020,300.0",
        ];
        let dir = tempdir()?;
        let name = "top_5_districts_with_highest_wheat_yield_in_last_5_years.csv";

        let conn = load_rows(header, &rows)?;
        let (headers, out) = run_named(&conn, name, dir.path())?;
        assert_eq!(headers, vec!["District", "Yield_Growth"]);
        assert_eq!(out[0][0], "New");
        assert_eq!(out[0][1].parse::<f64>()?, 200.0);
        assert_eq!(out[1][0], "Old");
        assert_eq!(out[1][1].parse::<f64>()?, 0.0);

        // a later year moves the window past everything above
        rows.push("Late,2030,10.0");
        let conn = load_rows(header, &rows)?;
        let (_, out) = run_named(&conn, name, dir.path())?;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0][0], "Late");
        assert_eq!(out[0][1].parse::<f64>()?, 0.0);
        Ok(())
    }

    #[test]
    fn oilseed_growth_is_percent_of_minimum() -> Result<()> {
        let header = "STATE_NAME,YEAR,OILSEEDS_PRODUCTION_(1000_TONS)";
        let rows = [
            "A,2015,10.0",
            "A,2020,15.0",
            "B,2016,4.0",
            "B,2019,12.0",
            // window is 2015..=2020
            "B,2014,1.0",
            "Z,2017,0.0",
            "Z,2018,5.0",
        ];
        let conn = load_rows(header, &rows)?;
        let dir = tempdir()?;

        let (headers, out) = run_named(
            &conn,
            "top_5_states_with_highest_oilseed_production_growth_in_last_5_years.csv",
            dir.path(),
        )?;
        assert_eq!(headers, vec!["State", "Percent_Growth"]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0][0], "B");
        assert_eq!(out[0][1].parse::<f64>()?, 200.0);
        assert_eq!(out[1][0], "A");
        assert_eq!(out[1][1].parse::<f64>()?, 50.0);
        // zero minimum: null growth, sorted last
        assert_eq!(out[2], vec!["Z".to_string(), String::new()]);
        Ok(())
    }

    #[test]
    fn groundnut_report_is_fixed_to_2020() -> Result<()> {
        let header = "STATE_NAME,DIST_NAME,YEAR,GROUNDNUT_PRODUCTION_(1000_TONS)";
        let rows = [
            "A,a1,2019,99.0",
            "A,a1,2020,1.0",
            "B,b1,2020,3.0",
            "B,b1,2020,4.0",
        ];
        let conn = load_rows(header, &rows)?;
        let dir = tempdir()?;

        let (_, out) = run_named(
            &conn,
            "top_10_districts_by_groundnut_production_in_2020.csv",
            dir.path(),
        )?;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][..2], ["b1".to_string(), "B".to_string()]);
        assert_eq!(out[0][2].parse::<f64>()?, 7.0);
        assert_eq!(out[1][0], "a1");
        assert_eq!(out[1][2].parse::<f64>()?, 1.0);
        Ok(())
    }

    #[test]
    fn maize_average_is_rounded_per_year() -> Result<()> {
        let header = "YEAR,MAIZE_YIELD_(KG_PER_HA)";
        let rows = ["2021,1.0", "2020,1.0", "2020,2.0", "2020,2.0"];
        let conn = load_rows(header, &rows)?;
        let dir = tempdir()?;

        let (headers, out) = run_named(&conn, "year-wise_average_maize_yield.csv", dir.path())?;
        assert_eq!(headers, vec!["Year", "Avg_Maize_Yield"]);
        assert_eq!(out[0][0], "2020");
        assert_eq!(out[0][1].parse::<f64>()?, 1.67);
        assert_eq!(out[1][0], "2021");
        assert_eq!(out[1][1].parse::<f64>()?, 1.0);
        Ok(())
    }
}
