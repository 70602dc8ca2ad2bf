use std::fs;
use std::path::Path;

use cloudparity::{Assessment, CostInputs, Meter, ResourceModel, UsageRecord};
use rust_decimal::Decimal;
use serde_json::{json, Value};

fn write(root: &Path, key: &str, value: &Value) {
    let path = root.join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn config_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "ruleSets/RuleSets.json", &json!(["availability", "compute"]));
    write(
        root,
        "ruleSets/availability/Rules.json",
        &json!({
            "contentVersion": "1.0.0.0",
            "rules": [
                {
                    "name": "base",
                    "isAbstract": true,
                    "severity": "Error",
                    "category": "Availability",
                    "source": "https://learn.microsoft.com/azure/china/resources-developer-guide",
                    "pattern": {"type": "{type}", "location": "{location}"}
                },
                {
                    "name": "service-availability",
                    "base": "base",
                    "brief": "Service availability",
                    "pattern": {},
                    "evaluator": {"type": "BuiltIn.List", "configKey": "Services.json"}
                }
            ]
        }),
    );
    write(
        root,
        "ruleSets/availability/Services.json",
        &json!({
            "localization": {
                "ServiceMissing": "{type} is not available in {TargetRegionName}."
            },
            "blacklist": [
                {
                    "values": {
                        "type": ["Microsoft.Web/staticSites", "Microsoft.Maps/accounts"],
                        "location": "*"
                    },
                    "hitResource": "ServiceMissing"
                },
                {
                    "values": {"type": "Microsoft.Sql/managedInstances", "location": "chinaeast"}
                }
            ]
        }),
    );
    write(
        root,
        "ruleSets/compute/Rules.json",
        &json!([{
            "name": "vm-size",
            "brief": "Virtual machine size",
            "severity": "Warning",
            "category": "Compute",
            "source": "docs",
            "ignoreCase": false,
            "pattern": {
                "type": "Microsoft.Compute/virtualMachines",
                "properties": {"hardwareProfile": {"vmSize": "{size}"}}
            },
            "evaluator": {"type": "BuiltIn.List", "configKey": "VmSizes.json"}
        }]),
    );
    write(
        root,
        "ruleSets/compute/VmSizes.json",
        &json!({
            "whitelist": [{"values": {"size": ["Standard_D2s_v3", "Standard_D4s_v3"]}}],
            "whitelistNoHitMessage": "{size} is not offered in {TargetRegion}"
        }),
    );
    dir
}

fn resources() -> Vec<ResourceModel> {
    serde_json::from_value(json!([
        {
            "id": "/subscriptions/s/resourceGroups/web/providers/Microsoft.Web/staticSites/docs",
            "details": {"type": "Microsoft.Web/staticSites", "location": "eastasia"}
        },
        {
            "id": "/subscriptions/s/resourceGroups/vm/providers/Microsoft.Compute/virtualMachines/app",
            "details": {
                "type": "Microsoft.Compute/virtualMachines",
                "location": "eastus",
                "properties": {"hardwareProfile": {"vmSize": "Standard_D4s_v3"}}
            }
        },
        {
            "id": "/subscriptions/s/resourceGroups/vm/providers/Microsoft.Compute/virtualMachines/big",
            "details": {
                "type": "Microsoft.Compute/virtualMachines",
                "location": "eastus",
                "properties": {"hardwareProfile": {"vmSize": "standard_d2s_v3"}}
            }
        },
        {"id": "/subscriptions/s/resourceGroups/rg", "details": null}
    ]))
    .unwrap()
}

#[test]
fn assesses_subscription_from_file_store() {
    let dir = config_dir();
    let assessment = Assessment::from_config_dir(dir.path()).unwrap();
    assert_eq!(assessment.rule_engine().rules().len(), 2);

    let result = assessment.parity(&resources(), "chinanorth3");
    assert!(!result.pass());
    assert_eq!(result.resources.len(), 3);

    let site = result
        .resource("/subscriptions/s/resourceGroups/web/providers/Microsoft.Web/staticSites/docs")
        .unwrap();
    assert_eq!(
        site.details()[0].message.as_deref(),
        Some("Microsoft.Web/staticSites is not available in China North 3.")
    );

    let app = result
        .resource("/subscriptions/s/resourceGroups/vm/providers/Microsoft.Compute/virtualMachines/app")
        .unwrap();
    assert!(app.pass());
    assert_eq!(app.details().len(), 2);

    let big = result
        .resource("/subscriptions/s/resourceGroups/vm/providers/Microsoft.Compute/virtualMachines/big")
        .unwrap();
    let failure = big.details().iter().find(|d| !d.pass).unwrap();
    assert_eq!(failure.brief, "Virtual machine size");
    assert_eq!(
        failure.message.as_deref(),
        Some("standard_d2s_v3 is not offered in chinanorth3")
    );
    assert_eq!(failure.path, "properties.hardwareProfile.vmSize");
}

#[test]
fn location_overlay_targets_destination_region() {
    let dir = config_dir();
    let assessment = Assessment::from_config_dir(dir.path()).unwrap();
    let sql = vec![ResourceModel::new(
        "sql",
        json!({"type": "Microsoft.Sql/managedInstances", "location": "westus"}),
    )];

    assert!(!assessment.parity(&sql, "chinaeast").pass());
    assert!(assessment.parity(&sql, "chinanorth2").pass());
}

#[test]
fn combined_report_includes_cost() {
    let dir = config_dir();
    let assessment = Assessment::from_config_dir(dir.path()).unwrap();

    let meters: Vec<Meter> = serde_json::from_value(json!([{
        "meterId": "global-lrs",
        "meterName": "LRS Data Stored",
        "meterCategory": "Storage",
        "meterSubCategory": "Block Blob",
        "unit": "1 GB/Month",
        "meterRates": {"0": "0.10", "100": "0.08"}
    }]))
    .unwrap();
    let target: Vec<Meter> = serde_json::from_value(json!([{
        "meterId": "china-lrs",
        "meterName": "LRS Data Stored",
        "meterCategory": "Storage",
        "meterSubCategory": "Block Blob",
        "unit": "1 GB/Month",
        "meterRates": {"0": "0.12"}
    }]))
    .unwrap();
    let usage = vec![UsageRecord {
        resource_id: "acct".into(),
        meter_id: "global-lrs".into(),
        quantity: "150".parse().unwrap(),
    }];

    let report = assessment
        .run(
            &[],
            "chinaeast2",
            Some(CostInputs {
                usage,
                source_meters: meters,
                target_meters: target,
                target_region: None,
            }),
        )
        .unwrap();

    assert!(report.pass());
    let cost = report.cost.unwrap();
    assert_eq!(cost.total_source_cost, "14.00".parse::<Decimal>().unwrap());
    assert_eq!(cost.total_target_cost, "18.00".parse::<Decimal>().unwrap());
}

#[test]
fn cost_uses_meters_of_the_assessed_region() {
    let dir = config_dir();
    let assessment = Assessment::from_config_dir(dir.path()).unwrap();

    let source: Vec<Meter> = serde_json::from_value(json!([{
        "meterId": "G-LRS",
        "meterName": "LRS Data Stored",
        "meterCategory": "Storage",
        "meterSubCategory": "Block Blob",
        "unit": "1 GB/Month",
        "meterRegion": "US East",
        "meterRates": {"0": "0.10"}
    }]))
    .unwrap();
    let target: Vec<Meter> = serde_json::from_value(json!([
        {
            "meterId": "C-EAST",
            "meterName": "LRS Data Stored",
            "meterCategory": "Storage",
            "meterSubCategory": "Block Blob",
            "unit": "1 GB/Month",
            "meterRegion": "CN East",
            "meterRates": {"0": "0.12"}
        },
        {
            "meterId": "C-NORTH3",
            "meterName": "LRS Data Stored",
            "meterCategory": "Storage",
            "meterSubCategory": "Block Blob",
            "unit": "1 GB/Month",
            "meterRegion": "CN North 3",
            "meterRates": {"0": "0.14"}
        }
    ]))
    .unwrap();
    let usage = vec![UsageRecord {
        resource_id: "acct".into(),
        meter_id: "G-LRS".into(),
        quantity: "100".parse().unwrap(),
    }];

    let report = assessment
        .run(
            &[],
            "chinanorth3",
            Some(CostInputs {
                usage,
                source_meters: source,
                target_meters: target,
                target_region: None,
            }),
        )
        .unwrap();

    let cost = report.cost.unwrap();
    assert_eq!(cost.lines[0].target_meter_id.as_deref(), Some("C-NORTH3"));
    assert_eq!(cost.total_target_cost, "14.00".parse::<Decimal>().unwrap());
}
