//! Tests for decoding and encoding complete profiles.

use bytes::Bytes;
use crate::decode::ErrorKind;
use crate::limits::Limits;
use super::*;


//------------ Test Data -----------------------------------------------------

const ICCID: &[u8] = b"\x98\x10\x32\x54\x76\x98\x10\x32\x54\xF6";

/// A header with version 2.3 followed by an end element.
const MINIMAL: &[u8] = b"\
    \xA0\x12\
        \x80\x01\x02\
        \x81\x01\x03\
        \x83\x0A\x98\x10\x32\x54\x76\x98\x10\x32\x54\xF6\
    \xBF\x3F\x05\
        \xA0\x03\x81\x01\x01\
";

/// An end element whose identification isn’t minimally encoded.
const LAX_END: &[u8] = b"\xBF\x3F\x06\xA0\x04\x81\x02\x00\x01";

fn minimal() -> Vec<u8> {
    MINIMAL.to_vec()
}

fn concat(parts: &[&[u8]]) -> Bytes {
    Bytes::from(parts.concat())
}


//------------ Round Trips ---------------------------------------------------

#[test]
fn programmatic_profile() {
    let mut profile = Profile::new();
    profile.push(ElementValue::Header(
        ProfileHeader::new(2, 3, Bytes::from_static(ICCID))
    ));
    profile.push(ElementValue::End(End::new(ElementHeader {
        identification: Some(1),
        .. Default::default()
    })));
    assert!(profile.iter().all(|element| element.raw().is_none()));

    let encoded = profile.encode().unwrap();
    assert_eq!(encoded, MINIMAL);

    let decoded = Profile::decode(Bytes::from(encoded)).unwrap();
    assert_eq!(decoded.len(), 2);
    let header = decoded.header().unwrap();
    assert_eq!(header.major_version, Some(2));
    assert_eq!(header.minor_version, Some(3));
    assert_eq!(header.iccid.as_deref(), Some(ICCID));
    assert_eq!(decoded.end().unwrap().header.identification, Some(1));
    assert_eq!(decoded.encode().unwrap(), MINIMAL);
    for (left, right) in profile.iter().zip(decoded.iter()) {
        assert_eq!(left.value(), right.value());
    }
}

#[test]
fn untouched_elements_are_copied() {
    let data = concat(&[MINIMAL, LAX_END]);
    let profile = Profile::decode(data.clone()).unwrap();
    assert_eq!(profile.len(), 3);

    let lax = &profile.elements()[2];
    assert_eq!(lax.raw().map(Captured::as_slice), Some(LAX_END));
    assert_eq!(lax.to_vec().unwrap(), LAX_END);
    assert_eq!(profile.encode().unwrap(), &data[..]);

    // The value itself encodes minimally.
    let mut structural = Vec::new();
    lax.value().append_encoded(&mut structural).unwrap();
    assert_eq!(structural, b"\xBF\x3F\x05\xA0\x03\x81\x01\x01");
}

#[test]
fn edited_element_is_reencoded() {
    let data = concat(&[MINIMAL, LAX_END]);
    let mut profile = Profile::decode(data).unwrap();

    if let Some(mut element) = profile.element_mut(0) {
        if let ElementValue::Header(header) = &mut *element {
            header.minor_version = Some(4);
        }
    }
    assert!(profile.elements()[0].raw().is_none());
    assert!(profile.elements()[2].raw().is_some());
    assert_eq!(profile.header().unwrap().minor_version, Some(4));

    let mut expected = minimal();
    expected[7] = 0x04;
    expected.extend_from_slice(LAX_END);
    assert_eq!(profile.encode().unwrap(), expected);
}

#[test]
fn edit_can_change_kind() {
    let mut profile = Profile::from_slice(MINIMAL).unwrap();
    assert!(profile.end().is_some());
    if let Some(mut element) = profile.element_mut(1) {
        *element = ElementValue::Unknown(
            Captured::new(Tag::ctx(48).constructed(), b"\x80\x00")
        );
    }
    assert!(profile.end().is_none());
    assert_eq!(
        profile.elements()[1].to_vec().unwrap(), b"\xBF\x30\x02\x80\x00"
    );
}

#[test]
fn value_mut_drops_raw() {
    let profile = Profile::from_slice(LAX_END).unwrap();
    let mut element = profile.into_elements().remove(0);
    assert!(element.raw().is_some());
    let _ = element.value_mut();
    assert!(element.raw().is_none());
    assert_eq!(
        element.to_vec().unwrap(), b"\xBF\x3F\x05\xA0\x03\x81\x01\x01"
    );
}


//------------ Element Kinds -------------------------------------------------

#[test]
fn kind_table() {
    for kind in Kind::ALL {
        let tag = kind.tag().unwrap();
        assert_eq!(Kind::from_tag(tag), kind);
    }
    assert_eq!(Kind::from_tag(5), Kind::Unknown);
    assert_eq!(Kind::from_tag(62), Kind::Unknown);
    assert_eq!(Kind::Unknown.tag(), None);
    assert_eq!(Kind::Df5gs.to_string(), "DF-5GS");
}

#[test]
fn unknown_elements_are_kept() {
    let data = concat(&[
        MINIMAL, b"\xBF\x30\x03\x80\x01\x05", b"\x85\x01\x00"
    ]);
    let profile = Profile::decode(data.clone()).unwrap();
    assert_eq!(profile.len(), 4);

    let unknown = &profile.elements()[2];
    assert_eq!(unknown.kind(), Kind::Unknown);
    assert_eq!(unknown.tag(), 48);
    assert_eq!(
        unknown.value(),
        &ElementValue::Unknown(
            Captured::new(Tag::ctx(48).constructed(), b"\x80\x01\x05")
        )
    );

    // A primitive record is never a structured element.
    let primitive = &profile.elements()[3];
    assert_eq!(primitive.kind(), Kind::Unknown);
    assert_eq!(primitive.tag(), 5);

    assert_eq!(profile.encode().unwrap(), &data[..]);
}

#[test]
fn unknown_records_keep_their_identifier() {
    let data: &[&[u8]] = &[
        b"\x80\x01\x05", b"\x65\x03\x80\x01\x01", b"\xDF\x40\x00",
    ];
    for &part in data {
        let mut element = Profile::from_slice(part).unwrap()
            .into_elements().remove(0);
        let value = element.value().clone();
        let _ = element.value_mut();
        assert!(element.raw().is_none());
        assert_eq!(element.to_vec().unwrap(), part);

        let decoded = Profile::from_slice(&element.to_vec().unwrap()).unwrap();
        assert_eq!(decoded.elements()[0].value(), &value);
    }
}

#[test]
fn repeated_fields_are_kept() {
    let data = b"\xBF\x3F\x08\xA0\x06\x81\x01\x01\x81\x01\x02";
    let mut element = Profile::from_slice(data).unwrap()
        .into_elements().remove(0);
    match element.value() {
        ElementValue::End(end) => {
            assert_eq!(end.header.identification, Some(1));
            assert_eq!(end.header.extra.len(), 1);
        }
        _ => panic!("not an end element"),
    }
    let _ = element.value_mut();
    assert_eq!(element.to_vec().unwrap(), data);
}

#[test]
fn quick_access() {
    let data = concat(&[
        MINIMAL,
        b"\xBF\x37\x00",
        b"\xBF\x39\x00",
        b"\xBF\x37\x05\xA0\x03\x81\x01\x07",
        b"\xB6\x00",
        b"\xB6\x05\xA0\x03\x81\x01\x09",
    ]);
    let profile = Profile::decode(data).unwrap();
    assert_eq!(profile.security_domains().count(), 2);
    assert_eq!(
        profile.security_domains().nth(1).unwrap().header.identification,
        Some(7)
    );
    assert_eq!(profile.applications().count(), 1);
    let aka = profile.aka_parameter().unwrap();
    assert!(aka.header.identification.is_none());
    assert!(profile.master_file().is_none());
    assert!(profile.pin_codes().is_none());

    let collected: Profile = profile.iter().cloned().collect();
    assert_eq!(collected, profile);
}

#[test]
fn long_form_tags() {
    let mut profile = Profile::new();
    profile.push(ElementValue::Application(Application::default()));
    profile.push(ElementValue::End(End::default()));
    assert_eq!(
        profile.encode().unwrap(), b"\xBF\x39\x02\xA0\x00\xBF\x3F\x02\xA0\x00"
    );
    assert_eq!(profile.applications().count(), 1);
}

#[test]
fn missing_field_fails_encode() {
    let mut profile = Profile::new();
    profile.push(ElementValue::SecurityDomain(SecurityDomain::default()));
    assert_eq!(
        profile.encode(),
        Err(EncodeError::missing("SecurityDomain", "instance"))
    );
}


//------------ Defensive Decoding --------------------------------------------

#[test]
fn truncated_element_is_clamped() {
    let data = concat(&[MINIMAL, b"\xBF\x3F\x09\xA0\x03\x81\x01\x01"]);
    let profile = Profile::decode(data.clone()).unwrap();
    assert_eq!(profile.len(), 3);
    assert_eq!(
        profile.elements()[2].raw().map(Captured::as_slice),
        Some(&b"\xBF\x3F\x09\xA0\x03\x81\x01\x01"[..])
    );
    assert_eq!(profile.encode().unwrap(), &data[..]);

    let err = Profile::decode_with(
        data, Limits::default().reject_truncated(true)
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedElement);
    assert_eq!(err.pos().to_usize(), MINIMAL.len());
    assert_eq!(err.element(), Some(2));
}

#[test]
fn indefinite_element() {
    let data = concat(&[
        MINIMAL, b"\xBF\x3F\x80\xA0\x03\x81\x01\x01\x00\x00"
    ]);
    let profile = Profile::decode(data.clone()).unwrap();
    assert_eq!(profile.len(), 3);
    let end = &profile.elements()[2];
    assert_eq!(end.kind(), Kind::End);
    assert_eq!(end.raw().map(Captured::len), Some(10));
    assert_eq!(profile.encode().unwrap(), &data[..]);

    let mut structural = Vec::new();
    end.value().append_encoded(&mut structural).unwrap();
    assert_eq!(structural, b"\xBF\x3F\x05\xA0\x03\x81\x01\x01");
}

#[test]
fn failure_names_offset_and_element() {
    let err = Profile::decode(concat(&[MINIMAL, b"\xBF\x81"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TagContinuation);
    assert_eq!(err.pos().to_usize(), MINIMAL.len() + 2);
    assert_eq!(err.element(), Some(2));

    let err = Profile::from_slice(b"\xA0\x05\x80").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
    assert_eq!(err.pos().to_usize(), 3);
    assert_eq!(err.element(), Some(0));
}

#[test]
fn nesting_is_limited() {
    // Eight nested indefinite values inside an unknown element.
    let mut data = vec![0xBF, 0x30, 0x80];
    for _ in 0..8 {
        data.extend_from_slice(b"\xA1\x80");
    }
    for _ in 0..9 {
        data.extend_from_slice(b"\x00\x00");
    }
    let data = Bytes::from(data);

    assert!(Profile::decode(data.clone()).is_ok());
    let err = Profile::decode_with(
        data, Limits::default().with_max_depth(4)
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooDeep(4));
    assert_eq!(err.element(), Some(0));
}

#[test]
fn empty_profile() {
    let profile = Profile::decode(Bytes::new()).unwrap();
    assert!(profile.is_empty());
    assert!(profile.header().is_none());
    assert_eq!(profile.encode().unwrap(), b"");
}
