//! `README.md` heading layout.

use crate::context::{CheckContext, Sources};
use crate::documents::{Heading, Manifest, Readme};
use crate::error::{CheckFailure, CheckResult, ensure};
use crate::policy::Policy;
use crate::runner::Runner;
use std::rc::Rc;

type ReadmeCheck = fn(&Readme, &Policy) -> CheckResult;

fn on_readme(
    runner: &mut Runner<CheckContext>,
    policy: &Rc<Policy>,
    description: String,
    check: ReadmeCheck,
) {
    let policy = Rc::clone(policy);
    runner.register(description, move |ctx| check(ctx.readme()?, &policy));
}

fn marker(depth: u8, text: &str) -> String {
    format!("{} {text}", "#".repeat(usize::from(depth)))
}

fn show(heading: &Heading) -> String {
    marker(heading.depth, &heading.text)
}

/// Heading `index` (0-based) must exist with the given depth and text.
fn heading_is(readme: &Readme, index: usize, depth: u8, text: &str) -> CheckResult {
    let expected = marker(depth, text);
    let Some(heading) = readme.headings.get(index) else {
        return Err(CheckFailure::new(format!(
            "heading {} is missing, expected {expected:?}",
            index + 1
        )));
    };
    ensure(heading.depth == depth && heading.text == text, || {
        format!(
            "heading {} is {:?}, expected {expected:?}",
            index + 1,
            show(heading)
        )
    })
}

pub fn load(ctx: &mut CheckContext) -> CheckResult {
    ctx.readme = None;
    let readme = Readme::parse(ctx.sources.readme.text()?);
    log::info!(
        "loaded {} ({} headings)",
        ctx.sources.readme.label,
        readme.headings.len()
    );
    ctx.readme = Some(readme);
    Ok(())
}

pub fn title(readme: &Readme, manifest: &Manifest) -> CheckResult {
    let name = manifest
        .name
        .as_deref()
        .ok_or_else(|| CheckFailure::new("name is missing".to_string()))?;
    heading_is(readme, 0, 1, name)
}

pub fn example(readme: &Readme, p: &Policy) -> CheckResult {
    heading_is(readme, 1, 2, &p.example_heading)
}

pub fn installation(readme: &Readme, p: &Policy) -> CheckResult {
    heading_is(readme, 2, 2, &p.installation_heading)
}

pub fn api(readme: &Readme, p: &Policy) -> CheckResult {
    ensure(
        readme.at_depth(2).any(|heading| heading.text == p.api_heading),
        || format!("no heading {:?}", marker(2, &p.api_heading)),
    )
}

pub fn closing(readme: &Readme, p: &Policy) -> CheckResult {
    let want = p.closing_headings.len();
    let have = readme.headings.len();
    if have < want {
        return Err(CheckFailure::new(format!(
            "only {have} headings, expected the last {want} to be {}",
            p.closing_headings
                .iter()
                .map(|text| format!("{:?}", marker(2, text)))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    let tail = &readme.headings[have - want..];
    let mismatches: Vec<String> = tail
        .iter()
        .zip(&p.closing_headings)
        .enumerate()
        .filter(|(_, (heading, text))| heading.depth != 2 || heading.text != **text)
        .map(|(offset, (heading, text))| {
            format!(
                "heading {} is {:?}, expected {:?}",
                have - want + offset + 1,
                show(heading),
                marker(2, text)
            )
        })
        .collect();
    ensure(mismatches.is_empty(), || mismatches.join("; "))
}

pub fn description(readme: &Readme, manifest: &Manifest) -> CheckResult {
    let description = manifest
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .ok_or_else(|| CheckFailure::new("description is missing".to_string()))?;
    let gap = readme.between(0, 1).ok_or_else(|| {
        CheckFailure::new("README needs at least two headings to place the description".to_string())
    })?;
    ensure(gap.contains(description), || {
        format!("description {description:?} does not appear between the first two headings")
    })
}

pub fn register(runner: &mut Runner<CheckContext>, policy: &Rc<Policy>) {
    let p: &Policy = policy;
    let file = Sources::README_FILE;

    runner.register(format!("{file} should be a readable Markdown file"), load);
    runner.register(
        format!(r##"{file} first heading should be "# <package.json name>""##),
        |ctx| title(ctx.readme()?, ctx.manifest()?),
    );
    on_readme(
        runner,
        policy,
        format!(
            r#"{file} second heading should be "{}""#,
            marker(2, &p.example_heading)
        ),
        example,
    );
    on_readme(
        runner,
        policy,
        format!(
            r#"{file} third heading should be "{}""#,
            marker(2, &p.installation_heading)
        ),
        installation,
    );
    on_readme(
        runner,
        policy,
        format!(r#"{file} should have an "{}" section"#, marker(2, &p.api_heading)),
        api,
    );
    on_readme(
        runner,
        policy,
        format!(
            "{file} should end with {}",
            p.closing_headings
                .iter()
                .map(|text| format!("\"{}\"", marker(2, text)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        closing,
    );
    runner.register(
        format!(r#"{file} should have package.json "description" right after the title"#),
        |ctx| description(ctx.readme()?, ctx.manifest()?),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const README: &str = "\
# @gramex/charts

Charts for Gramex dashboards.

## Example

```js
import { chart } from \"@gramex/charts\";
```

## Installation

## API

### chart()

## Release notes

## Authors

## License
";

    fn manifest() -> Manifest {
        Manifest::parse(
            &json!({"name": "@gramex/charts", "description": "Charts for Gramex dashboards."})
                .to_string(),
        )
        .expect("manifest should parse")
    }

    #[test]
    fn conforming_readme_passes_everything() {
        let p = Policy::default();
        let readme = Readme::parse(README);
        assert!(title(&readme, &manifest()).is_ok());
        assert!(example(&readme, &p).is_ok());
        assert!(installation(&readme, &p).is_ok());
        assert!(api(&readme, &p).is_ok());
        assert!(closing(&readme, &p).is_ok());
        assert!(description(&readme, &manifest()).is_ok());
    }

    #[test]
    fn closing_names_the_mismatch() {
        let p = Policy::default();
        let swapped = README.replace("## Authors\n\n## License", "## License\n\n## Authors");
        let err = closing(&Readme::parse(swapped), &p).unwrap_err();
        assert_eq!(
            err.message,
            r###"heading 6 is "## License", expected "## Authors"; heading 7 is "## Authors", expected "## License""###
        );

        let renamed = README.replace("## Release notes", "## Changelog");
        let err = closing(&Readme::parse(renamed), &p).unwrap_err();
        assert_eq!(
            err.message,
            r###"heading 5 is "## Changelog", expected "## Release notes""###
        );

        let short = Readme::parse("# x\n\n## License\n");
        assert!(closing(&short, &p).unwrap_err().message.starts_with("only 2 headings"));
    }

    #[test]
    fn positional_headings() {
        let p = Policy::default();
        let readme = Readme::parse("# @gramex/other\n\n## Installation\n");
        assert_eq!(
            title(&readme, &manifest()).unwrap_err().message,
            r###"heading 1 is "# @gramex/other", expected "# @gramex/charts""###
        );
        assert_eq!(
            example(&readme, &p).unwrap_err().message,
            r###"heading 2 is "## Installation", expected "## Example""###
        );
        assert_eq!(
            installation(&readme, &p).unwrap_err().message,
            r###"heading 3 is missing, expected "## Installation""###
        );
        assert_eq!(api(&readme, &p).unwrap_err().message, r###"no heading "## API""###);
    }

    #[test]
    fn description_must_sit_under_title() {
        let readme = Readme::parse(
            "# @gramex/charts\n\n## Example\n\nCharts for Gramex dashboards.\n",
        );
        assert_eq!(
            description(&readme, &manifest()).unwrap_err().message,
            r#"description "Charts for Gramex dashboards." does not appear between the first two headings"#
        );

        let title_only = Readme::parse("# @gramex/charts\n\nCharts for Gramex dashboards.\n");
        assert_eq!(
            description(&title_only, &manifest()).unwrap_err().message,
            "README needs at least two headings to place the description"
        );

        let setext = Readme::parse(
            "@gramex/charts\n==============\n\nCharts for Gramex dashboards.\n\n## Example\n",
        );
        assert_eq!(setext.headings[0].depth, 1);
        assert_eq!(setext.headings[0].text, "@gramex/charts");
        let gap = setext.between(0, 1).expect("two headings");
        assert!(!gap.contains('='), "underline belongs to the title span: {gap:?}");
        assert!(title(&setext, &manifest()).is_ok());
        assert!(description(&setext, &manifest()).is_ok());
    }
}
