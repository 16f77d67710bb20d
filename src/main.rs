use contmem_rs::{RecordList, StrideVec};

fn main() {
    let mut vec = StrideVec::new(size_of::<u64>()).unwrap();
    let count = 1000 * 1000;
    for i in 0..count as u64 {
        vec.push(&i.to_ne_bytes()).unwrap();
    }

    assert_eq!(vec.len(), count);
    let mid = u64::from_ne_bytes(vec.get(count / 2).unwrap().try_into().unwrap());
    assert_eq!(mid, count as u64 / 2);

    let mut list = RecordList::new(0);
    for i in 0..1000u32 {
        list.append(format!("record-{i}").as_bytes()).unwrap();
    }

    assert_eq!(list.len(), 1000);
    assert_eq!(list.get(999).unwrap().payload(), b"record-999");

    let snapshot = list.get(0).unwrap().view_persistent();
    list.append(b"one more").unwrap();
    assert_eq!(&*snapshot, b"record-0");
}
