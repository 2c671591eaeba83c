use astm_lis::codec::checksum;
use astm_lis::constants::{CR, ETX, STX};
use astm_lis::instruments::InstrumentRegistry;
use astm_lis::wrapper::Wrapper;

fn build_message(body: &str) -> Vec<u8> {
    let mut payload = vec![b'1'];
    payload.extend_from_slice(body.as_bytes());
    payload.push(CR);
    payload.push(ETX);
    let cs = checksum(&payload);
    let mut out = vec![STX];
    out.extend_from_slice(&payload);
    out.extend_from_slice(cs.as_bytes());
    out.push(CR);
    out.push(b'\n');
    out
}

#[test]
fn architect_header_selects_vendor_schema_and_decodes_sender() {
    let body = "H|\\^&|||ARCHITECT^1.00^123456789^H1P1O1R1C1Q1L1|||||||P||20240101120000";
    let message = build_message(body);

    let registry = InstrumentRegistry::with_builtins();
    let wrapper = Wrapper::new(vec![message], &registry);

    assert_eq!(wrapper.instrument(), Some("abbott_architect"));

    let dict = wrapper.to_dict().unwrap();
    let header = &dict["H"][0];
    assert_eq!(header["sender"]["name"], "ARCHITECT");
    assert_eq!(header["sender"]["version"], "1.00");
    assert_eq!(header["sender"]["serial"], "123456789");
    assert_eq!(header["processing_id"], "P");
}

#[test]
fn unrecognized_header_falls_back_to_generic_mapping() {
    let body = "H|\\^&|||SOMEOTHERANALYZER|||||||P||20240101120000";
    let message = build_message(body);

    let registry = InstrumentRegistry::with_builtins();
    let wrapper = Wrapper::new(vec![message], &registry);

    assert_eq!(wrapper.instrument(), None);
    let dict = wrapper.to_dict().unwrap();
    assert!(dict.get("H").is_some());
}
