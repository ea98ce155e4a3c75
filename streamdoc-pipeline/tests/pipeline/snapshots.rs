use crate::common::{render, REPORT};
use streamdoc_pipeline::{build_document, DocumentBuilder, PipelineOptions};

#[test]
fn test_report_tag_snapshot() {
    let doc = build_document(REPORT, &PipelineOptions::default());
    insta::assert_snapshot!(render(&doc), @r##"
    <document finished="true" page-control="submit">
      <markdown-text id="1"># Quarterly outlook\n\nRevenue grew in every region.</markdown-text>
      <markdown-table id="2">
        <header>Region | Q1 | Q2</header>
        <row>EU | 10 | 12</row>
        <row>US | 14 | 15</row>
      </markdown-table>
      <container id="3" title="Scenarios">
        <trend id="3-1.1">Base case
          <point likelihood="0.6" timestamp="2025-01"></point>
          <point likelihood="0.7" timestamp="2025-02"></point>
        </trend>
        <chart id="3-1.2">Revenue
          <series name="EU">10, 12</series>
        </chart>
      </container>
      <question-group id="4">
        <question id="4-1.1" name="focus">Which region should we focus on?
          <choice value="eu">Europe</choice>
          <choice value="us">United States</choice>
        </question>
        <question id="4-1.2" name="notes">Anything else?
          <input name="notes" placeholder="Optional" multiline="true"></input>
        </question>
      </question-group>
    </document>
    "##);
}

#[test]
fn test_mid_container_snapshot() {
    let cut = REPORT.find("Base case").expect("trend in report");
    let doc = DocumentBuilder::default().build(&REPORT[..cut], false);
    insta::assert_snapshot!(render(&doc), @r##"
    <document finished="false" page-control="none">
      <markdown-text id="1"># Quarterly outlook\n\nRevenue grew in every region.</markdown-text>
      <markdown-table id="2">
        <header>Region | Q1 | Q2</header>
        <row>EU | 10 | 12</row>
        <row>US | 14 | 15</row>
      </markdown-table>
      <markdown-text id="3">### Scenarios</markdown-text>
    </document>
    "##);
}

#[test]
fn test_widget_error_snapshot() {
    let doc = build_document(
        "Numbers:\n<ai-viz name=\"PIE\">{\"slices\": [1, 2]}</ai-viz>",
        &PipelineOptions::default(),
    );
    insta::assert_snapshot!(render(&doc), @r##"
    <document finished="true" page-control="none">
      <markdown-text id="1">Numbers:</markdown-text>
      <error stage="widget" item="1">unknown widget kind &apos;PIE&apos;</error>
    </document>
    "##);
}
