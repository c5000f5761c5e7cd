//! Layout properties that must hold for every sample model variant.

use pixmodel_core::DataType;
use pixmodel_sample::{
    BandedSampleModel, ComponentSampleModel, PackedSampleModel, PixelInterleavedSampleModel,
    SampleModel,
};

const TYPES: [DataType; 4] = [DataType::Byte, DataType::UShort, DataType::Short, DataType::Int];

fn models(data_type: DataType) -> Vec<SampleModel> {
    let mut v: Vec<SampleModel> = vec![
        ComponentSampleModel::new(data_type, 5, 4, 3, 16, vec![2, 0, 1])
            .unwrap()
            .into(),
        ComponentSampleModel::with_banks(data_type, 5, 4, 1, 5, vec![1, 0, 1], vec![0, 3, 20])
            .unwrap()
            .into(),
        BandedSampleModel::new(data_type, 5, 4, 3).unwrap().into(),
        PixelInterleavedSampleModel::new(data_type, 5, 4, 4, 22, vec![3, 0, 1])
            .unwrap()
            .into(),
    ];
    if data_type != DataType::Short {
        let bits = data_type.bits();
        let third = bits / 3;
        let mask = (1u32 << third) - 1;
        v.push(
            PackedSampleModel::new(data_type, 5, 4, &[mask << (2 * third), mask << third, mask])
                .unwrap()
                .into(),
        );
    }
    v
}

fn pattern(x: i32, y: i32, b: usize, sm: &SampleModel) -> i32 {
    let max = (1i64 << sm.sample_size(b).unwrap().min(15)) - 1;
    ((x * 7 + y * 13 + b as i32 * 3) as i64 % (max + 1)) as i32
}

#[test]
fn pixel_round_trip() {
    for dt in TYPES {
        for sm in models(dt) {
            let buf = sm.create_data_buffer().unwrap();
            for y in 0..sm.height() {
                for x in 0..sm.width() {
                    let px: Vec<i32> = (0..sm.num_bands()).map(|b| pattern(x, y, b, &sm)).collect();
                    sm.set_pixel(x, y, &px, &buf).unwrap();
                }
            }
            for y in 0..sm.height() {
                for x in 0..sm.width() {
                    let before = sm.get_pixel(x, y, &buf).unwrap();
                    sm.set_pixel(x, y, &before, &buf).unwrap();
                    assert_eq!(sm.get_pixel(x, y, &buf).unwrap(), before, "{} {dt}", sm.kind_name());
                    let expect: Vec<i32> = (0..sm.num_bands()).map(|b| pattern(x, y, b, &sm)).collect();
                    assert_eq!(before, expect, "{} {dt} at ({x}, {y})", sm.kind_name());
                }
            }
        }
    }
}

#[test]
fn subset_preserves_requested_order() {
    for dt in TYPES {
        for sm in models(dt) {
            let buf = sm.create_data_buffer().unwrap();
            let all: Vec<i32> = (0..sm.width() * sm.height() * 3).map(|i| i % 7).collect();
            sm.set_pixels(0, 0, sm.width(), sm.height(), &all, &buf).unwrap();

            let sub = sm.create_subset_sample_model(&[2, 0]).unwrap();
            assert_eq!(sub.num_bands(), 2);
            for (x, y) in [(0, 0), (4, 3), (2, 1)] {
                assert_eq!(sub.get_sample(x, y, 0, &buf).unwrap(), sm.get_sample(x, y, 2, &buf).unwrap());
                assert_eq!(sub.get_sample(x, y, 1, &buf).unwrap(), sm.get_sample(x, y, 0, &buf).unwrap());
            }
        }
    }
}

#[test]
fn compatible_preserves_bands_and_type() {
    for dt in TYPES {
        for sm in models(dt) {
            for (w, h) in [(1, 1), (9, 2), (3, 17)] {
                let c = sm.create_compatible_sample_model(w, h).unwrap();
                assert_eq!(c.num_bands(), sm.num_bands());
                assert_eq!(c.data_type(), sm.data_type());
                assert_eq!(c.kind_name(), sm.kind_name());
                assert_eq!((c.width(), c.height()), (w, h));
            }
        }
    }
}

#[test]
fn created_buffer_covers_every_address() {
    for dt in TYPES {
        for sm in models(dt) {
            let derived = [
                sm.clone(),
                sm.create_compatible_sample_model(6, 3).unwrap(),
                sm.create_subset_sample_model(&[1]).unwrap(),
            ];
            for m in derived {
                let buf = m.create_data_buffer().unwrap();
                for y in 0..m.height() {
                    for x in 0..m.width() {
                        for b in 0..m.num_bands() {
                            m.set_sample(x, y, b, 1, &buf).unwrap();
                            assert_eq!(m.get_sample(x, y, b, &buf).unwrap(), 1);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn compatible_layout_does_not_alias_samples() {
    for dt in TYPES {
        for sm in models(dt) {
            let c = sm.create_compatible_sample_model(4, 3).unwrap();
            let buf = c.create_data_buffer().unwrap();
            let n = c.num_bands() as i32;
            for y in 0..3 {
                for x in 0..4 {
                    for b in 0..c.num_bands() {
                        let v = (y * 4 + x) * n + b as i32;
                        let v = v % (1 << c.sample_size(b).unwrap().min(15));
                        c.set_sample(x, y, b, v, &buf).unwrap();
                    }
                }
            }
            for y in 0..3 {
                for x in 0..4 {
                    for b in 0..c.num_bands() {
                        let v = (y * 4 + x) * n + b as i32;
                        let v = v % (1 << c.sample_size(b).unwrap().min(15));
                        assert_eq!(c.get_sample(x, y, b, &buf).unwrap(), v);
                    }
                }
            }
        }
    }
}
